use indexmap::IndexMap;

/// A named bucket of paths sharing a first segment.
#[derive(Debug, Clone, PartialEq)]
pub struct PathGroup {
    pub name: String,
    pub paths: Vec<String>,
}

/// One flattened (group, path) conversion unit.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupedPath {
    pub group: String,
    pub path: String,
}

/// Classify every path by its first non-empty segment, capitalized. Paths
/// with no non-empty segment are dropped. Groups keep first-appearance
/// order; paths keep document order within their group.
pub fn group_paths<'a, I>(paths: I) -> Vec<PathGroup>
where
    I: IntoIterator<Item = &'a String>,
{
    let mut groups: IndexMap<String, Vec<String>> = IndexMap::new();

    for path in paths {
        let Some(segment) = path.split('/').find(|s| !s.is_empty()) else {
            continue;
        };
        groups
            .entry(capitalize(segment))
            .or_default()
            .push(path.clone());
    }

    groups
        .into_iter()
        .map(|(name, paths)| PathGroup { name, paths })
        .collect()
}

/// Grouped paths, flattened back into per-path units for the conversion
/// loop.
pub fn grouped_units<'a, I>(paths: I) -> Vec<GroupedPath>
where
    I: IntoIterator<Item = &'a String>,
{
    group_paths(paths)
        .into_iter()
        .flat_map(|group| {
            group.paths.into_iter().map(move |path| GroupedPath {
                group: group.name.clone(),
                path,
            })
        })
        .collect()
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
