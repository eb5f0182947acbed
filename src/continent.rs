//! Country to continent lookup and continent colours
//!
//! Countries are matched by English short name, a handful of common aliases
//! (as they appear in bibliometric exports), or ISO 3166 alpha-2/alpha-3 code.
//! Anything unrecognised maps to [`Continent::Other`].

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Continent used to colour collaborator markers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Continent {
    Africa,
    Asia,
    Europe,
    NorthAmerica,
    SouthAmerica,
    Oceania,
    Other,
}

impl Continent {
    pub const ALL: [Continent; 7] = [
        Continent::Europe,
        Continent::Asia,
        Continent::NorthAmerica,
        Continent::SouthAmerica,
        Continent::Africa,
        Continent::Oceania,
        Continent::Other,
    ];

    /// Default marker colour
    pub fn default_color(&self) -> &'static str {
        match self {
            Continent::Europe => "blue",
            Continent::Asia => "red",
            Continent::NorthAmerica => "green",
            Continent::SouthAmerica => "orange",
            Continent::Africa => "purple",
            Continent::Oceania => "cyan",
            Continent::Other => "gray",
        }
    }

    /// Key used in config files (`north_america`, ...)
    pub fn key(&self) -> &'static str {
        match self {
            Continent::Africa => "africa",
            Continent::Asia => "asia",
            Continent::Europe => "europe",
            Continent::NorthAmerica => "north_america",
            Continent::SouthAmerica => "south_america",
            Continent::Oceania => "oceania",
            Continent::Other => "other",
        }
    }
}

impl fmt::Display for Continent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Continent::Africa => write!(f, "Africa"),
            Continent::Asia => write!(f, "Asia"),
            Continent::Europe => write!(f, "Europe"),
            Continent::NorthAmerica => write!(f, "North America"),
            Continent::SouthAmerica => write!(f, "South America"),
            Continent::Oceania => write!(f, "Oceania"),
            Continent::Other => write!(f, "Other"),
        }
    }
}

use Continent::{
    Africa as AF, Asia as AS, Europe as EU, NorthAmerica as NA, Oceania as OC, SouthAmerica as SA,
};

/// (name, alpha-2, alpha-3, continent)
const COUNTRIES: &[(&str, &str, &str, Continent)] = &[
    // Europe
    ("albania", "al", "alb", EU),
    ("andorra", "ad", "and", EU),
    ("austria", "at", "aut", EU),
    ("belarus", "by", "blr", EU),
    ("belgium", "be", "bel", EU),
    ("bosnia and herzegovina", "ba", "bih", EU),
    ("bulgaria", "bg", "bgr", EU),
    ("croatia", "hr", "hrv", EU),
    ("czechia", "cz", "cze", EU),
    ("denmark", "dk", "dnk", EU),
    ("estonia", "ee", "est", EU),
    ("finland", "fi", "fin", EU),
    ("france", "fr", "fra", EU),
    ("germany", "de", "deu", EU),
    ("greece", "gr", "grc", EU),
    ("hungary", "hu", "hun", EU),
    ("iceland", "is", "isl", EU),
    ("ireland", "ie", "irl", EU),
    ("italy", "it", "ita", EU),
    ("kosovo", "xk", "xkx", EU),
    ("latvia", "lv", "lva", EU),
    ("liechtenstein", "li", "lie", EU),
    ("lithuania", "lt", "ltu", EU),
    ("luxembourg", "lu", "lux", EU),
    ("malta", "mt", "mlt", EU),
    ("moldova", "md", "mda", EU),
    ("monaco", "mc", "mco", EU),
    ("montenegro", "me", "mne", EU),
    ("netherlands", "nl", "nld", EU),
    ("north macedonia", "mk", "mkd", EU),
    ("norway", "no", "nor", EU),
    ("poland", "pl", "pol", EU),
    ("portugal", "pt", "prt", EU),
    ("romania", "ro", "rou", EU),
    ("russian federation", "ru", "rus", EU),
    ("san marino", "sm", "smr", EU),
    ("serbia", "rs", "srb", EU),
    ("slovakia", "sk", "svk", EU),
    ("slovenia", "si", "svn", EU),
    ("spain", "es", "esp", EU),
    ("sweden", "se", "swe", EU),
    ("switzerland", "ch", "che", EU),
    ("ukraine", "ua", "ukr", EU),
    ("united kingdom", "gb", "gbr", EU),
    // Asia
    ("afghanistan", "af", "afg", AS),
    ("armenia", "am", "arm", AS),
    ("azerbaijan", "az", "aze", AS),
    ("bahrain", "bh", "bhr", AS),
    ("bangladesh", "bd", "bgd", AS),
    ("bhutan", "bt", "btn", AS),
    ("brunei darussalam", "bn", "brn", AS),
    ("cambodia", "kh", "khm", AS),
    ("china", "cn", "chn", AS),
    ("cyprus", "cy", "cyp", AS),
    ("georgia", "ge", "geo", AS),
    ("hong kong", "hk", "hkg", AS),
    ("india", "in", "ind", AS),
    ("indonesia", "id", "idn", AS),
    ("iran", "ir", "irn", AS),
    ("iraq", "iq", "irq", AS),
    ("israel", "il", "isr", AS),
    ("japan", "jp", "jpn", AS),
    ("jordan", "jo", "jor", AS),
    ("kazakhstan", "kz", "kaz", AS),
    ("kuwait", "kw", "kwt", AS),
    ("kyrgyzstan", "kg", "kgz", AS),
    ("lao people's democratic republic", "la", "lao", AS),
    ("lebanon", "lb", "lbn", AS),
    ("macao", "mo", "mac", AS),
    ("malaysia", "my", "mys", AS),
    ("maldives", "mv", "mdv", AS),
    ("mongolia", "mn", "mng", AS),
    ("myanmar", "mm", "mmr", AS),
    ("nepal", "np", "npl", AS),
    ("north korea", "kp", "prk", AS),
    ("oman", "om", "omn", AS),
    ("pakistan", "pk", "pak", AS),
    ("palestine", "ps", "pse", AS),
    ("philippines", "ph", "phl", AS),
    ("qatar", "qa", "qat", AS),
    ("saudi arabia", "sa", "sau", AS),
    ("singapore", "sg", "sgp", AS),
    ("south korea", "kr", "kor", AS),
    ("sri lanka", "lk", "lka", AS),
    ("syrian arab republic", "sy", "syr", AS),
    ("taiwan", "tw", "twn", AS),
    ("tajikistan", "tj", "tjk", AS),
    ("thailand", "th", "tha", AS),
    ("timor-leste", "tl", "tls", AS),
    ("turkey", "tr", "tur", AS),
    ("turkmenistan", "tm", "tkm", AS),
    ("united arab emirates", "ae", "are", AS),
    ("uzbekistan", "uz", "uzb", AS),
    ("viet nam", "vn", "vnm", AS),
    ("yemen", "ye", "yem", AS),
    // North America
    ("bahamas", "bs", "bhs", NA),
    ("barbados", "bb", "brb", NA),
    ("belize", "bz", "blz", NA),
    ("canada", "ca", "can", NA),
    ("costa rica", "cr", "cri", NA),
    ("cuba", "cu", "cub", NA),
    ("dominican republic", "do", "dom", NA),
    ("el salvador", "sv", "slv", NA),
    ("greenland", "gl", "grl", NA),
    ("guatemala", "gt", "gtm", NA),
    ("haiti", "ht", "hti", NA),
    ("honduras", "hn", "hnd", NA),
    ("jamaica", "jm", "jam", NA),
    ("mexico", "mx", "mex", NA),
    ("nicaragua", "ni", "nic", NA),
    ("panama", "pa", "pan", NA),
    ("puerto rico", "pr", "pri", NA),
    ("trinidad and tobago", "tt", "tto", NA),
    ("united states", "us", "usa", NA),
    // South America
    ("argentina", "ar", "arg", SA),
    ("bolivia", "bo", "bol", SA),
    ("brazil", "br", "bra", SA),
    ("chile", "cl", "chl", SA),
    ("colombia", "co", "col", SA),
    ("ecuador", "ec", "ecu", SA),
    ("guyana", "gy", "guy", SA),
    ("paraguay", "py", "pry", SA),
    ("peru", "pe", "per", SA),
    ("suriname", "sr", "sur", SA),
    ("uruguay", "uy", "ury", SA),
    ("venezuela", "ve", "ven", SA),
    // Africa
    ("algeria", "dz", "dza", AF),
    ("angola", "ao", "ago", AF),
    ("benin", "bj", "ben", AF),
    ("botswana", "bw", "bwa", AF),
    ("burkina faso", "bf", "bfa", AF),
    ("burundi", "bi", "bdi", AF),
    ("cameroon", "cm", "cmr", AF),
    ("cabo verde", "cv", "cpv", AF),
    ("chad", "td", "tcd", AF),
    ("congo", "cg", "cog", AF),
    ("democratic republic of the congo", "cd", "cod", AF),
    ("cote d'ivoire", "ci", "civ", AF),
    ("egypt", "eg", "egy", AF),
    ("eritrea", "er", "eri", AF),
    ("eswatini", "sz", "swz", AF),
    ("ethiopia", "et", "eth", AF),
    ("gabon", "ga", "gab", AF),
    ("gambia", "gm", "gmb", AF),
    ("ghana", "gh", "gha", AF),
    ("guinea", "gn", "gin", AF),
    ("kenya", "ke", "ken", AF),
    ("lesotho", "ls", "lso", AF),
    ("liberia", "lr", "lbr", AF),
    ("libya", "ly", "lby", AF),
    ("madagascar", "mg", "mdg", AF),
    ("malawi", "mw", "mwi", AF),
    ("mali", "ml", "mli", AF),
    ("mauritania", "mr", "mrt", AF),
    ("mauritius", "mu", "mus", AF),
    ("morocco", "ma", "mar", AF),
    ("mozambique", "mz", "moz", AF),
    ("namibia", "na", "nam", AF),
    ("niger", "ne", "ner", AF),
    ("nigeria", "ng", "nga", AF),
    ("rwanda", "rw", "rwa", AF),
    ("senegal", "sn", "sen", AF),
    ("sierra leone", "sl", "sle", AF),
    ("somalia", "so", "som", AF),
    ("south africa", "za", "zaf", AF),
    ("south sudan", "ss", "ssd", AF),
    ("sudan", "sd", "sdn", AF),
    ("tanzania", "tz", "tza", AF),
    ("togo", "tg", "tgo", AF),
    ("tunisia", "tn", "tun", AF),
    ("uganda", "ug", "uga", AF),
    ("zambia", "zm", "zmb", AF),
    ("zimbabwe", "zw", "zwe", AF),
    // Oceania
    ("australia", "au", "aus", OC),
    ("fiji", "fj", "fji", OC),
    ("french polynesia", "pf", "pyf", OC),
    ("kiribati", "ki", "kir", OC),
    ("new caledonia", "nc", "ncl", OC),
    ("new zealand", "nz", "nzl", OC),
    ("papua new guinea", "pg", "png", OC),
    ("samoa", "ws", "wsm", OC),
    ("solomon islands", "sb", "slb", OC),
    ("tonga", "to", "ton", OC),
    ("vanuatu", "vu", "vut", OC),
];

/// Alternative spellings seen in exports, mapped to the canonical name above
const ALIASES: &[(&str, &str)] = &[
    ("usa", "united states"),
    ("united states of america", "united states"),
    ("uk", "united kingdom"),
    ("great britain", "united kingdom"),
    ("england", "united kingdom"),
    ("scotland", "united kingdom"),
    ("wales", "united kingdom"),
    ("northern ireland", "united kingdom"),
    ("russia", "russian federation"),
    ("czech republic", "czechia"),
    ("korea", "south korea"),
    ("republic of korea", "south korea"),
    ("korea, republic of", "south korea"),
    ("iran, islamic republic of", "iran"),
    ("vietnam", "viet nam"),
    ("laos", "lao people's democratic republic"),
    ("syria", "syrian arab republic"),
    ("brunei", "brunei darussalam"),
    ("turkiye", "turkey"),
    ("türkiye", "turkey"),
    ("macedonia", "north macedonia"),
    ("the netherlands", "netherlands"),
    ("holland", "netherlands"),
    ("ivory coast", "cote d'ivoire"),
    ("côte d'ivoire", "cote d'ivoire"),
    ("swaziland", "eswatini"),
    ("cape verde", "cabo verde"),
    ("dr congo", "democratic republic of the congo"),
    ("congo, the democratic republic of the", "democratic republic of the congo"),
    ("hong kong sar", "hong kong"),
    ("macau", "macao"),
    ("taiwan, province of china", "taiwan"),
    ("bolivia, plurinational state of", "bolivia"),
    ("venezuela, bolivarian republic of", "venezuela"),
    ("tanzania, united republic of", "tanzania"),
    ("moldova, republic of", "moldova"),
    ("palestine, state of", "palestine"),
];

fn normalize_country(country: &str) -> String {
    country
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Look up the continent of a country name or ISO code
pub fn continent_for_country(country: &str) -> Continent {
    let key = normalize_country(country);
    if key.is_empty() {
        return Continent::Other;
    }

    let canonical = ALIASES
        .iter()
        .find(|(alias, _)| *alias == key)
        .map(|(_, name)| *name)
        .unwrap_or(key.as_str());

    COUNTRIES
        .iter()
        .find(|(name, a2, a3, _)| *name == canonical || *a2 == canonical || *a3 == canonical)
        .map(|(_, _, _, continent)| *continent)
        .unwrap_or(Continent::Other)
}

/// Continent to colour mapping with optional overrides
#[derive(Debug, Clone, Default)]
pub struct Palette {
    overrides: HashMap<Continent, String>,
}

impl Palette {
    /// Build a palette from `continent key -> colour` overrides.
    ///
    /// Unknown keys are returned so the caller can report them.
    pub fn with_overrides(overrides: &HashMap<String, String>) -> (Self, Vec<String>) {
        let mut palette = Palette::default();
        let mut unknown = Vec::new();
        for (key, color) in overrides {
            match Continent::ALL.iter().find(|c| c.key() == key.as_str()) {
                Some(continent) => {
                    palette.overrides.insert(*continent, color.clone());
                }
                None => unknown.push(key.clone()),
            }
        }
        unknown.sort();
        (palette, unknown)
    }

    pub fn color(&self, continent: Continent) -> &str {
        self.overrides
            .get(&continent)
            .map(String::as_str)
            .unwrap_or_else(|| continent.default_color())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_name() {
        assert_eq!(continent_for_country("Germany"), Continent::Europe);
        assert_eq!(continent_for_country("Japan"), Continent::Asia);
        assert_eq!(continent_for_country("Brazil"), Continent::SouthAmerica);
        assert_eq!(continent_for_country("Kenya"), Continent::Africa);
        assert_eq!(continent_for_country("New Zealand"), Continent::Oceania);
        assert_eq!(continent_for_country("Canada"), Continent::NorthAmerica);
    }

    #[test]
    fn test_lookup_by_alias_and_code() {
        assert_eq!(continent_for_country("USA"), Continent::NorthAmerica);
        assert_eq!(continent_for_country("United States"), Continent::NorthAmerica);
        assert_eq!(continent_for_country("  united   kingdom "), Continent::Europe);
        assert_eq!(continent_for_country("South Korea"), Continent::Asia);
        assert_eq!(continent_for_country("AU"), Continent::Oceania);
        assert_eq!(continent_for_country("deu"), Continent::Europe);
        assert_eq!(continent_for_country("Russia"), Continent::Europe);
    }

    #[test]
    fn test_unknown_is_other() {
        assert_eq!(continent_for_country(""), Continent::Other);
        assert_eq!(continent_for_country("Atlantis"), Continent::Other);
        assert_eq!(continent_for_country("Antarctica"), Continent::Other);
    }

    #[test]
    fn test_codes_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for (name, a2, a3, _) in COUNTRIES {
            assert!(seen.insert(*name), "duplicate name {}", name);
            assert!(seen.insert(*a2), "duplicate code {}", a2);
            assert!(seen.insert(*a3), "duplicate code {}", a3);
        }
    }

    #[test]
    fn test_palette_defaults_and_overrides() {
        let palette = Palette::default();
        assert_eq!(palette.color(Continent::Europe), "blue");
        assert_eq!(palette.color(Continent::Other), "gray");

        let mut overrides = HashMap::new();
        overrides.insert("europe".to_string(), "#123456".to_string());
        overrides.insert("mars".to_string(), "red".to_string());
        let (palette, unknown) = Palette::with_overrides(&overrides);
        assert_eq!(palette.color(Continent::Europe), "#123456");
        assert_eq!(palette.color(Continent::Asia), "red");
        assert_eq!(unknown, vec!["mars".to_string()]);
    }
}
