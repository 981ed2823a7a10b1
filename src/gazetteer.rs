//! Best-effort geolocation of free-text facility names.
//!
//! A gazetteer is an ordered list of `(key, coordinate)` pairs. A name
//! resolves to the coordinate of the first key whose slug occurs in the
//! name's slug. Scanning is strictly first-match: when keys overlap (say
//! `"gare"` and `"sud de france"`), whoever maintains the list must put the
//! more specific key first.

use anyhow::{Context, Result};
use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

use crate::occupancy::types::Coordinate;

static NON_ALNUM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("valid regex"));

/// Lowercase, ASCII-only, hyphen-separated form of `text`.
///
/// Diacritics are stripped via NFKD decomposition, non-alphanumeric runs
/// collapse to a single `-`, and leading/trailing hyphens are removed.
#[must_use]
pub fn slugify(text: &str) -> String {
    let ascii: String = text.nfkd().filter(char::is_ascii).collect();
    let lower = ascii.to_lowercase();
    NON_ALNUM_RE
        .replace_all(&lower, "-")
        .trim_matches('-')
        .to_string()
}

#[derive(Debug, Clone, PartialEq)]
pub struct GazetteerEntry {
    pub key: String,
    slug: String,
    pub coordinate: Coordinate,
}

impl GazetteerEntry {
    pub fn new(key: impl Into<String>, coordinate: Coordinate) -> Self {
        let key = key.into();
        let slug = slugify(&key);
        Self {
            key,
            slug,
            coordinate,
        }
    }
}

/// Immutable ordered lookup table.
#[derive(Debug, Clone, Default)]
pub struct Gazetteer {
    entries: Vec<GazetteerEntry>,
}

impl Gazetteer {
    pub fn new(entries: Vec<GazetteerEntry>) -> Self {
        Self { entries }
    }

    /// Builds a gazetteer from `(key, [lat, lon])` pairs, keeping their order.
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, [f64; 2])>,
    {
        Self::new(
            pairs
                .into_iter()
                .map(|(key, [lat, lon])| GazetteerEntry::new(key, Coordinate::new(lat, lon)))
                .collect(),
        )
    }

    /// Parses a JSON array of `["key", [lat, lon]]` pairs.
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        let pairs: Vec<(String, [f64; 2])> =
            serde_json::from_slice(bytes).context("Invalid gazetteer JSON")?;
        Ok(Self::new(
            pairs
                .into_iter()
                .map(|(key, [lat, lon])| GazetteerEntry::new(key, Coordinate::new(lat, lon)))
                .collect(),
        ))
    }

    /// Montpellier car parks and bike-share stations, most specific keys
    /// first.
    pub fn builtin() -> Self {
        Self::from_pairs(BUILTIN.iter().copied())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First entry whose key occurs in `name`, comparing slugs.
    pub fn lookup(&self, name: &str) -> Option<&GazetteerEntry> {
        let slug = slugify(name);
        if slug.is_empty() {
            return None;
        }
        self.entries
            .iter()
            .find(|e| !e.slug.is_empty() && slug.contains(&e.slug))
    }

    pub fn resolve(&self, name: &str) -> Option<Coordinate> {
        self.lookup(name).map(|e| e.coordinate)
    }
}

static BUILTIN: &[(&str, [f64; 2])] = &[
    // Bike stations whose names contain a car park key.
    ("antigone centre", [43.6087, 3.8888]),
    ("comedie baudin", [43.6085, 3.8797]),
    ("rue jules ferry", [43.6035, 3.8788]),
    ("parvis jules ferry", [43.6035, 3.8788]),
    ("pont de lattes", [43.5990, 3.8840]),
    ("deux ponts", [43.5980, 3.8850]),
    ("sud de france", [43.5968, 3.9234]),
    ("gaumont-circe", [43.6055, 3.9180]),
    ("gaumont est", [43.6060, 3.9200]),
    ("gaumont ouest", [43.6065, 3.9195]),
    ("place albert 1er", [43.6145, 3.8730]),
    ("albert 1er", [43.6145, 3.8730]),
    // Car parks.
    ("antigone", [43.6087, 3.8888]),
    ("comedie", [43.6085, 3.8797]),
    ("corum", [43.6138, 3.8822]),
    ("europa", [43.6078, 3.8925]),
    ("foch", [43.6107, 3.8765]),
    ("gambetta", [43.6069, 3.8713]),
    ("gare", [43.6032, 3.8785]),
    ("triangle", [43.6092, 3.8818]),
    ("pitot", [43.6125, 3.8698]),
    ("circe", [43.6049, 3.9178]),
    ("garcia lorca", [43.5909, 3.8907]),
    ("mosson", [43.6162, 3.8196]),
    ("sabines", [43.5838, 3.8602]),
    ("sablassou", [43.6341, 3.9223]),
    ("saint jean le sec", [43.5708, 3.8379]),
    ("euromedecine", [43.6389, 3.8277]),
    ("occitanie", [43.6345, 3.8485]),
    ("vicarello", [43.6325, 3.8989]),
    ("charles de gaulle", [43.6285, 3.8977]),
    ("polygone", [43.6083, 3.8847]),
    ("arc de triomphe", [43.6112, 3.8724]),
    // Bike stations.
    ("nouveau saint-roch", [43.5950, 3.8780]),
    ("halles castellane", [43.6095, 3.8765]),
    ("observatoire", [43.6060, 3.8760]),
    ("rondelet", [43.6040, 3.8740]),
    ("plan cabanes", [43.6080, 3.8680]),
    ("boutonnet", [43.6230, 3.8670]),
    ("emile combes", [43.6180, 3.8850]),
    ("beaux-arts", [43.6160, 3.8830]),
    ("les aubes", [43.6150, 3.8950]),
    ("médiathèque emile zola", [43.6080, 3.8930]),
    ("nombre d or", [43.6085, 3.8870]),
    ("louis blanc", [43.6150, 3.8750]),
    ("port marianne", [43.6000, 3.8990]),
    ("les arceaux", [43.6115, 3.8680]),
    ("cité mion", [43.6020, 3.8830]),
    ("renouvier", [43.6050, 3.8600]),
    ("odysseum", [43.6049, 3.9178]),
    ("saint-denis", [43.6050, 3.8710]),
    ("richter", [43.6030, 3.8950]),
    ("charles flahault", [43.6200, 3.8600]),
    ("voltaire", [43.6030, 3.8800]),
    ("prés d arènes", [43.5900, 3.8850]),
    ("vert bois", [43.6400, 3.8500]),
    ("malbosc", [43.6350, 3.8300]),
    ("fac des sciences", [43.6310, 3.8610]),
    ("fac de lettres", [43.6315, 3.8700]),
    ("aiguelongue", [43.6250, 3.8800]),
    ("jeu de mail des abbés", [43.6200, 3.8850]),
    ("marie caizergues", [43.6200, 3.8750]),
    ("celleneuve", [43.6130, 3.8400]),
    ("jardin de la lironde", [43.6050, 3.9050]),
    ("père soulas", [43.6250, 3.8500]),
    ("place viala", [43.6180, 3.8550]),
    ("hôtel du département", [43.6220, 3.8500]),
    ("tonnelles", [43.6150, 3.8450]),
    ("providence - ovalie", [43.5950, 3.8550]),
    ("pérols etang de l or", [43.5650, 3.9600]),
    ("saint-guilhem", [43.6090, 3.8740]),
    ("jean de beins", [43.6070, 3.8850]),
    ("hôtel de ville", [43.5992, 3.8958]),
];

#[cfg(test)]
mod tests {
    use super::*;

    const GARE: [f64; 2] = [43.6032, 3.8785];
    const SUD: [f64; 2] = [43.5968, 3.9234];

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Médiathèque Émile Zola"), "mediatheque-emile-zola");
        assert_eq!(slugify("  Nombre d'Or  "), "nombre-d-or");
        assert_eq!(slugify("Gaumont--Circé!!"), "gaumont-circe");
        assert_eq!(slugify("Place Albert 1er"), "place-albert-1er");
        assert_eq!(slugify("***"), "");
    }

    #[test]
    fn test_first_match_wins_generic_first() {
        let g = Gazetteer::from_pairs([("gare", GARE), ("sud de france", SUD)]);
        assert_eq!(
            g.resolve("Sud de France - Gare"),
            Some(Coordinate::new(GARE[0], GARE[1]))
        );
    }

    #[test]
    fn test_first_match_wins_specific_first() {
        let g = Gazetteer::from_pairs([("sud de france", SUD), ("gare", GARE)]);
        assert_eq!(
            g.resolve("Sud de France - Gare"),
            Some(Coordinate::new(SUD[0], SUD[1]))
        );
    }

    #[test]
    fn test_match_ignores_case_and_accents() {
        let g = Gazetteer::builtin();
        assert_eq!(g.lookup("MEDIATHEQUE EMILE ZOLA").unwrap().key, "médiathèque emile zola");
        assert_eq!(g.lookup("Comédie").unwrap().key, "comedie");
        assert_eq!(g.lookup("Nombre d'Or").unwrap().key, "nombre d or");
    }

    #[test]
    fn test_builtin_prefers_specific_keys() {
        let g = Gazetteer::builtin();
        assert_eq!(g.lookup("Antigone centre").unwrap().key, "antigone centre");
        assert_eq!(g.lookup("Antigone").unwrap().key, "antigone");
        assert_eq!(g.lookup("Rue Jules Ferry - Gare Saint-Roch").unwrap().key, "rue jules ferry");
        assert_eq!(g.lookup("Gaumont-Circé").unwrap().key, "gaumont-circe");
        assert_eq!(
            g.lookup("Pont de Lattes - Gare Saint-Roch").unwrap().key,
            "pont de lattes"
        );
        assert_eq!(
            g.lookup("Deux Ponts - Gare Saint-Roch").unwrap().key,
            "deux ponts"
        );
        assert_eq!(g.lookup("Fac des Sciences").unwrap().key, "fac des sciences");
    }

    #[test]
    fn test_no_match() {
        let g = Gazetteer::builtin();
        assert_eq!(g.resolve("Parking Inconnu"), None);
        assert_eq!(g.resolve(""), None);
    }

    #[test]
    fn test_from_json_keeps_order() {
        let json = br#"[["sud de france", [43.5968, 3.9234]], ["gare", [43.6032, 3.8785]]]"#;
        let g = Gazetteer::from_json(json).unwrap();
        assert_eq!(g.len(), 2);
        assert_eq!(g.lookup("Gare Sud de France").unwrap().key, "sud de france");
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(Gazetteer::from_json(b"{\"gare\": 1}").is_err());
    }

    #[test]
    fn test_from_json_rejects_invalid_utf8() {
        assert!(Gazetteer::from_json(b"[[\"gar\xff\", [43.6, 3.8]]]").is_err());
    }
}
