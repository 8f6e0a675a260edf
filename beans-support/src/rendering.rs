//! Text rendering helpers for registry diagnostics.
//!
//! Capability names come from [`std::any::type_name`], which spells out
//! every module path. These helpers trim them down for error messages and
//! render the override chain the way it is searched.

/// Separator used between layers of a rendered chain.
pub const CHAIN_ARROW: &str = " → ";

/// Renders the searched layers of a registry chain, innermost first.
///
/// # Examples
/// ```
/// use beans_support::rendering::render_layers;
///
/// let layers = ["override #2", "override #1", "root"];
/// assert_eq!(render_layers(&layers), "override #2 → override #1 → root");
/// ```
pub fn render_layers(layers: &[impl AsRef<str>]) -> String {
    let mut out = String::new();
    for (i, layer) in layers.iter().enumerate() {
        if i > 0 {
            out.push_str(CHAIN_ARROW);
        }
        out.push_str(layer.as_ref());
    }
    out
}

/// Drops module paths from a type name, keeping generics and `dyn`.
///
/// ```
/// use beans_support::rendering::short_type_name;
///
/// assert_eq!(short_type_name("dyn shapes::geometry::Shape"), "dyn Shape");
/// assert_eq!(
///     short_type_name("alloc::boxed::Box<dyn app::io::Sink + core::marker::Send>"),
///     "Box<dyn Sink + Send>"
/// );
/// ```
pub fn short_type_name(full: &str) -> String {
    let mut out = String::with_capacity(full.len());
    let mut segment_start = 0;
    let bytes = full.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b':' if bytes.get(i + 1) == Some(&b':') => {
                // Path separator: forget everything since the last boundary.
                i += 2;
                segment_start = i;
                continue;
            }
            b'<' | b'>' | b',' | b' ' | b'(' | b')' | b'&' | b'[' | b']' | b';' => {
                out.push_str(&full[segment_start..i]);
                out.push(bytes[i] as char);
                segment_start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }

    out.push_str(&full[segment_start..]);
    out
}

/// Picks the names from `available` that look like `requested`.
///
/// Comparison is case-insensitive on the shortened names. Closer matches
/// come first; at most `limit` names are returned.
///
/// ```
/// use beans_support::rendering::similar_names;
///
/// let bound = ["dyn app::Lexer", "dyn app::Parser", "dyn app::Clock"];
/// assert_eq!(similar_names("dyn app::Lexr", &bound, 2), vec!["dyn app::Lexer"]);
/// ```
pub fn similar_names<'a>(requested: &str, available: &[&'a str], limit: usize) -> Vec<&'a str> {
    let wanted = bare(requested);
    if wanted.is_empty() {
        return Vec::new();
    }

    let mut ranked: Vec<(usize, &'a str)> = available
        .iter()
        .filter_map(|&candidate| {
            let name = bare(candidate);
            if name == wanted {
                return None;
            }
            let score = if name.contains(&wanted) || wanted.contains(&name) {
                100
            } else {
                let prefix = name
                    .chars()
                    .zip(wanted.chars())
                    .take_while(|(a, b)| a == b)
                    .count();
                if prefix < 3 {
                    return None;
                }
                prefix * 10
            };
            Some((score, candidate))
        })
        .collect();

    ranked.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(b.1)));
    ranked.dedup_by(|a, b| a.1 == b.1);
    ranked.into_iter().take(limit).map(|(_, name)| name).collect()
}

fn bare(name: &str) -> String {
    let short = short_type_name(name).to_lowercase();
    short.strip_prefix("dyn ").map(str::to_owned).unwrap_or(short)
}
