//! Keyword normalization.
//!
//! Every command source funnels its object name through [`normalize_keyword`], and the
//! canonical form is what the resolver caches and what deletes match against.

/// Words that carry no identity ("a", "please") or only cosmetic intent ("beautiful")
const FILLER_WORDS: &[&str] = &[
    "a", "an", "the", "some", "please", "me", "my", "of", "with", "one", "new", "another",
    "beautiful", "elegant", "comfy", "comfortable", "cozy", "nice", "pretty", "lovely",
    "modern", "simple", "fancy", "cool", "little", "spinning",
];

/// Two-word phrases that collapse into a single canonical name
const COMPOUNDS: &[(&str, &str, &str)] = &[
    ("office", "chair", "officechair"),
    ("desk", "chair", "officechair"),
    ("spinning", "chair", "officechair"),
    ("office", "desk", "table"),
    ("beautiful", "chair", "armchair"),
    ("elegant", "chair", "armchair"),
    ("comfy", "chair", "armchair"),
    ("comfortable", "chair", "armchair"),
    ("arm", "chair", "armchair"),
    ("love", "seat", "sofa"),
    ("table", "lamp", "lamp"),
    ("floor", "lamp", "lamp"),
    ("potted", "plant", "plant"),
];

/// Single-word synonyms
const ALIASES: &[(&str, &str)] = &[
    ("desk", "table"),
    ("surface", "table"),
    ("couch", "sofa"),
    ("loveseat", "sofa"),
    ("seat", "chair"),
    ("light", "lamp"),
    ("flower", "plant"),
    ("tree", "plant"),
    ("vehicle", "car"),
    ("monster", "dragon"),
    ("person", "human"),
    ("character", "human"),
    ("box", "cube"),
    ("square", "cube"),
    ("ball", "sphere"),
    ("round", "sphere"),
    ("rug", "carpet"),
    ("television", "tv"),
];

/// Normalize a raw object phrase into its canonical keyword.
///
/// Returns `None` when nothing meaningful remains (empty input, or only filler words).
pub fn normalize_keyword(raw: &str) -> Option<String> {
    let cleaned: String = raw
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { ' ' })
        .collect();
    let words: Vec<&str> = cleaned.split_whitespace().collect();

    let merged = merge_compounds(&words);
    let kept: Vec<String> = merged
        .into_iter()
        .filter(|w| !FILLER_WORDS.contains(&w.as_str()))
        .map(|w| alias(&singularize(&w)).to_string())
        .collect();

    if kept.is_empty() {
        return None;
    }
    Some(kept.join(" "))
}

fn merge_compounds(words: &[&str]) -> Vec<String> {
    let mut out = Vec::with_capacity(words.len());
    let mut i = 0;
    while i < words.len() {
        if i + 1 < words.len() {
            let second = singularize(words[i + 1]);
            if let Some((_, _, merged)) = COMPOUNDS
                .iter()
                .find(|(a, b, _)| *a == words[i] && *b == second)
            {
                out.push((*merged).to_string());
                i += 2;
                continue;
            }
        }
        out.push(words[i].to_string());
        i += 1;
    }
    out
}

fn alias(word: &str) -> &str {
    ALIASES
        .iter()
        .find(|(from, _)| *from == word)
        .map(|(_, to)| *to)
        .unwrap_or(word)
}

/// Strip simple English plurals ("chairs", "boxes", "puppies")
pub fn singularize(word: &str) -> String {
    if word.len() <= 2 || word.ends_with("ss") || word.ends_with("us") {
        return word.to_string();
    }
    if let Some(stem) = word.strip_suffix("ies") {
        return format!("{stem}y");
    }
    for suffix in ["ches", "shes", "xes", "sses"] {
        if word.ends_with(suffix) {
            return word[..word.len() - 2].to_string();
        }
    }
    match word.strip_suffix('s') {
        Some(stem) => stem.to_string(),
        None => word.to_string(),
    }
}

/// Broad category used for type-aware scaling
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ObjectClass {
    Electronics,
    Furniture,
    Default,
}

impl ObjectClass {
    pub fn of(keyword: &str) -> Self {
        match keyword {
            "tv" | "computer" | "monitor" | "laptop" => ObjectClass::Electronics,
            "sofa" | "bed" | "table" | "chair" | "armchair" | "officechair" | "drawer"
            | "mattress" | "carpet" | "lamp" | "plant" | "bookshelf" | "cabinet" | "wardrobe" => {
                ObjectClass::Furniture
            }
            _ => ObjectClass::Default,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_fillers_and_adjectives() {
        assert_eq!(normalize_keyword("A sofa, please").as_deref(), Some("sofa"));
        assert_eq!(normalize_keyword("the lovely lamp").as_deref(), Some("lamp"));
    }

    #[test]
    fn merges_compounds_before_stripping() {
        assert_eq!(normalize_keyword("Office Chair").as_deref(), Some("officechair"));
        assert_eq!(normalize_keyword("desk chair").as_deref(), Some("officechair"));
        assert_eq!(normalize_keyword("office desk").as_deref(), Some("table"));
        assert_eq!(normalize_keyword("a beautiful chair").as_deref(), Some("armchair"));
    }

    #[test]
    fn applies_aliases_and_plurals() {
        assert_eq!(normalize_keyword("desk").as_deref(), Some("table"));
        assert_eq!(normalize_keyword("couches").as_deref(), Some("sofa"));
        assert_eq!(normalize_keyword("chairs").as_deref(), Some("chair"));
        assert_eq!(normalize_keyword("boxes").as_deref(), Some("cube"));
        assert_eq!(normalize_keyword("office chairs").as_deref(), Some("officechair"));
    }

    #[test]
    fn keeps_unknown_multiword_names() {
        assert_eq!(normalize_keyword("Coffee   Table!").as_deref(), Some("coffee table"));
        assert_eq!(
            normalize_keyword("zzz_unknown_creature").as_deref(),
            Some("zzz_unknown_creature")
        );
    }

    #[test]
    fn empty_or_filler_only_is_rejected() {
        assert_eq!(normalize_keyword(""), None);
        assert_eq!(normalize_keyword("   "), None);
        assert_eq!(normalize_keyword("a the please"), None);
    }

    #[test]
    fn singularize_leaves_non_plurals() {
        assert_eq!(singularize("glass"), "glass");
        assert_eq!(singularize("tv"), "tv");
        assert_eq!(singularize("cactus"), "cactus");
        assert_eq!(singularize("puppies"), "puppy");
    }

    #[test]
    fn classifies_objects() {
        assert_eq!(ObjectClass::of("tv"), ObjectClass::Electronics);
        assert_eq!(ObjectClass::of("sofa"), ObjectClass::Furniture);
        assert_eq!(ObjectClass::of("dragon"), ObjectClass::Default);
    }
}
