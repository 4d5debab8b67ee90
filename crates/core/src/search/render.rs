//! Text rendering for search pages and play-count listings.

use crate::catalog::{CatalogError, Clip, SoundCatalog};

/// Entries per search page.
pub const PAGE_SIZE: usize = 10;

/// Entries in the short most-played listing.
pub const SHORT_LIST_LIMIT: usize = 20;

const FENCE: &str = "```";

/// Render up to [`PAGE_SIZE`] clips starting at `offset`, with aliases.
///
/// Indices are 1-based and continue across pages. An empty page renders as
/// an empty string.
pub fn render_page(
    catalog: &dyn SoundCatalog,
    clips: &[Clip],
    offset: usize,
) -> Result<String, CatalogError> {
    let page = page_slice(clips, offset);
    if page.is_empty() {
        return Ok(String::new());
    }

    let mut out = String::from(FENCE);
    for (i, clip) in page.iter().enumerate() {
        let aliases = catalog.aliases_of(&clip.filename)?;
        out.push_str(&format!(
            "{}. {}: {}\nAliases: {} | Times Played: {}\n",
            offset + i + 1,
            clip.filename,
            clip.description,
            aliases.join(", "),
            clip.play_count
        ));
    }
    out.push_str(FENCE);
    Ok(out)
}

/// Render the first [`SHORT_LIST_LIMIT`] clips as `index. filename: N times`.
pub fn render_short(clips: &[Clip]) -> String {
    if clips.is_empty() {
        return String::new();
    }

    let mut out = String::from(FENCE);
    for (i, clip) in clips.iter().take(SHORT_LIST_LIMIT).enumerate() {
        out.push_str(&format!(
            "{}. {}: {}\n",
            i + 1,
            clip.filename,
            times(clip.play_count)
        ));
    }
    out.push_str(FENCE);
    out
}

/// Header line above a search page: match count plus a continuation prompt
/// when more pages remain.
pub fn page_header(total: usize, offset: usize, keyword: &str) -> String {
    let mut header = format!("{} {} found!", total, plural(total, "record", "records"));
    if has_more(total, offset) {
        header.push_str(&format!(" Type `{}` for next page:", keyword));
    }
    header
}

/// Whether results remain past the page starting at `offset`.
pub fn has_more(total: usize, offset: usize) -> bool {
    total > offset + PAGE_SIZE
}

pub(crate) fn page_slice(clips: &[Clip], offset: usize) -> &[Clip] {
    let start = offset.min(clips.len());
    let end = (offset + PAGE_SIZE).min(clips.len());
    &clips[start..end]
}

fn times(count: u32) -> String {
    format!("{} {}", count, plural(count as usize, "time", "times"))
}

fn plural<'a>(count: usize, one: &'a str, many: &'a str) -> &'a str {
    if count == 1 {
        one
    } else {
        many
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::SqliteSoundCatalog;

    fn clip(filename: &str, description: &str, play_count: u32) -> Clip {
        Clip {
            filename: filename.to_string(),
            description: description.to_string(),
            play_count,
        }
    }

    #[test]
    fn test_render_page_with_aliases() {
        let catalog = SqliteSoundCatalog::in_memory().unwrap();
        catalog.insert_clip("airhorn.mp3", "loud").unwrap();
        catalog.add_alias("horn", "airhorn.mp3").unwrap();
        catalog.add_alias("air", "airhorn.mp3").unwrap();

        let clips = vec![clip("airhorn.mp3", "loud", 3)];
        let page = render_page(&catalog, &clips, 0).unwrap();

        assert_eq!(
            page,
            "```1. airhorn.mp3: loud\nAliases: horn, air | Times Played: 3\n```"
        );
    }

    #[test]
    fn test_render_page_empty() {
        let catalog = SqliteSoundCatalog::in_memory().unwrap();
        assert_eq!(render_page(&catalog, &[], 0).unwrap(), "");
    }

    #[test]
    fn test_render_page_indices_continue() {
        let catalog = SqliteSoundCatalog::in_memory().unwrap();
        let clips: Vec<Clip> = (0..12).map(|i| clip(&format!("c{}.mp3", i), "x", 0)).collect();

        let page = render_page(&catalog, &clips, 10).unwrap();
        assert!(page.contains("11. c10.mp3: x"));
        assert!(page.contains("12. c11.mp3: x"));
        assert!(!page.contains("10. "));
    }

    #[test]
    fn test_render_short_pluralizes() {
        let clips = vec![
            clip("a.mp3", "ignored", 2),
            clip("b.mp3", "ignored", 1),
            clip("c.mp3", "ignored", 0),
        ];

        assert_eq!(
            render_short(&clips),
            "```1. a.mp3: 2 times\n2. b.mp3: 1 time\n3. c.mp3: 0 times\n```"
        );
    }

    #[test]
    fn test_render_short_truncates() {
        let clips: Vec<Clip> = (0..25).map(|i| clip(&format!("c{}.mp3", i), "x", 1)).collect();
        let out = render_short(&clips);

        assert!(out.contains("20. c19.mp3"));
        assert!(!out.contains("21. "));
    }

    #[test]
    fn test_page_header() {
        assert_eq!(page_header(1, 0, "next"), "1 record found!");
        assert_eq!(page_header(10, 0, "next"), "10 records found!");
        assert_eq!(
            page_header(11, 0, "next"),
            "11 records found! Type `next` for next page:"
        );
        assert_eq!(page_header(0, 0, "next"), "0 records found!");
    }

    #[test]
    fn test_page_slice_bounds() {
        let clips: Vec<Clip> = (0..23).map(|i| clip(&format!("c{}.mp3", i), "x", 0)).collect();
        assert_eq!(page_slice(&clips, 0).len(), 10);
        assert_eq!(page_slice(&clips, 20).len(), 3);
        assert!(page_slice(&clips, 30).is_empty());
    }
}
