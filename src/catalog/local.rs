//! Built-in model assets shipped with the application.

/// A predefined asset: file path relative to the asset root and its fixed import scale
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LocalAsset {
    pub keyword: &'static str,
    pub path: &'static str,
    pub scale: f32,
}

/// Known keywords. `table` and `chair` are known but have no asset of their own.
const LOCAL_ASSETS: &[(&str, Option<&str>, f32)] = &[
    ("sofa", Some("furniture/sofa.glb"), 1.0),
    ("bed", Some("furniture/simple_bed.glb"), 0.05),
    ("lamp", Some("furniture/simple_table_lamp.glb"), 1.0),
    ("plant", Some("furniture/plant_pot.glb"), 1.0),
    ("drawer", Some("furniture/bedside drawer.glb"), 1.2),
    ("carpet", Some("furniture/carpet_carpet.glb"), 0.02),
    ("mattress", Some("furniture/mattress.glb"), 0.3),
    ("computer", Some("furniture/Electronics/computer.glb"), 0.0001),
    ("tv", Some("furniture/Electronics/tv.glb"), 1.0),
    ("table", None, 1.0),
    ("chair", None, 1.0),
];

/// Look up the predefined asset for a canonical keyword
pub fn local_asset(keyword: &str) -> Option<LocalAsset> {
    LOCAL_ASSETS
        .iter()
        .find(|(k, _, _)| *k == keyword)
        .and_then(|&(keyword, path, scale)| {
            path.map(|path| LocalAsset {
                keyword,
                path,
                scale,
            })
        })
}

/// Keywords offered in the object palette, in display order
pub fn palette_keywords() -> impl Iterator<Item = &'static str> {
    LOCAL_ASSETS.iter().map(|(k, _, _)| *k).chain([
        "armchair",
        "officechair",
        "bookshelf",
        "car",
        "human",
        "dragon",
        "animal",
        "cube",
        "sphere",
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sofa_has_an_asset() {
        let asset = local_asset("sofa").expect("sofa is built in");
        assert_eq!(asset.path, "furniture/sofa.glb");
        assert_eq!(asset.scale, 1.0);
    }

    #[test]
    fn table_and_chair_have_no_asset() {
        assert!(local_asset("table").is_none());
        assert!(local_asset("chair").is_none());
        assert!(local_asset("bookshelf").is_none());
    }

    #[test]
    fn palette_has_no_duplicates() {
        let mut seen = std::collections::HashSet::new();
        assert!(palette_keywords().all(|k| seen.insert(k)));
    }
}
