//! Requested quality, resolution against advertised heights, and yt-dlp format selectors

use std::fmt;

/// What the user asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quality {
    /// Video capped at a height in pixels
    Height(u32),
    /// Best available video
    Best,
    /// Audio only, converted to mp3
    Mp3,
}

/// Qualities offered as buttons, in display order
pub const OFFERED_QUALITIES: [Quality; 5] = [
    Quality::Height(720),
    Quality::Height(480),
    Quality::Height(360),
    Quality::Best,
    Quality::Mp3,
];

/// Tallest tier offered as a button
pub const MAX_OFFERED_HEIGHT: u32 = 720;

impl Quality {
    /// Parses a callback or CLI code: `720`, `720p`, `best`, `mp3`.
    pub fn parse(code: &str) -> Option<Self> {
        let code = code.trim().to_ascii_lowercase();
        match code.as_str() {
            "best" => Some(Quality::Best),
            "mp3" | "audio" => Some(Quality::Mp3),
            other => other
                .strip_suffix('p')
                .unwrap_or(other)
                .parse::<u32>()
                .ok()
                .filter(|h| *h > 0)
                .map(Quality::Height),
        }
    }

    /// Short code used in callback payloads
    pub fn code(&self) -> String {
        match self {
            Quality::Height(h) => h.to_string(),
            Quality::Best => "best".to_string(),
            Quality::Mp3 => "mp3".to_string(),
        }
    }

    pub fn is_audio(&self) -> bool {
        matches!(self, Quality::Mp3)
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Quality::Height(h) => write!(f, "{}p", h),
            Quality::Best => write!(f, "best"),
            Quality::Mp3 => write!(f, "mp3"),
        }
    }
}

/// Outcome of matching a request against the heights a video advertises
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedQuality {
    Audio,
    /// A concrete height; `exact` is false when a lower height was substituted
    Height { requested: u32, height: u32, exact: bool },
    /// Best available; `requested` is set when this replaced a height that could not be honoured
    Best { requested: Option<u32> },
}

impl ResolvedQuality {
    /// Whether the user should be told the tier differs from the request
    pub fn is_adjusted(&self) -> bool {
        match self {
            ResolvedQuality::Audio => false,
            ResolvedQuality::Height { exact, .. } => !exact,
            ResolvedQuality::Best { requested } => requested.is_some(),
        }
    }

    /// Label of the tier actually used
    pub fn label(&self) -> String {
        match self {
            ResolvedQuality::Audio => "mp3".to_string(),
            ResolvedQuality::Height { height, .. } => format!("{}p", height),
            ResolvedQuality::Best { .. } => "best".to_string(),
        }
    }
}

/// Resolves a requested quality against the advertised heights.
///
/// An advertised exact height wins. Otherwise the closest advertised height
/// below the request is used, except that a request taller than both the
/// offered tiers and every advertised height uses best available. Best is also
/// used when nothing lower is advertised.
pub fn resolve_quality(requested: Quality, available_heights: &[u32]) -> ResolvedQuality {
    let target = match requested {
        Quality::Mp3 => return ResolvedQuality::Audio,
        Quality::Best => return ResolvedQuality::Best { requested: None },
        Quality::Height(h) => h,
    };

    if available_heights.contains(&target) {
        return ResolvedQuality::Height {
            requested: target,
            height: target,
            exact: true,
        };
    }

    let above_everything = available_heights.iter().all(|h| *h < target);
    if target > MAX_OFFERED_HEIGHT && above_everything {
        return ResolvedQuality::Best {
            requested: Some(target),
        };
    }

    match available_heights.iter().copied().filter(|h| *h < target).max() {
        Some(height) => ResolvedQuality::Height {
            requested: target,
            height,
            exact: false,
        },
        None => ResolvedQuality::Best {
            requested: Some(target),
        },
    }
}

/// Format selector for the first attempt
pub fn format_selector(resolved: &ResolvedQuality) -> String {
    match resolved {
        ResolvedQuality::Audio => "bestaudio/best".to_string(),
        ResolvedQuality::Height { height, .. } => format!(
            "bestvideo[height<={h}][ext=mp4]+bestaudio[ext=m4a]/best[height<={h}][ext=mp4]/bestvideo[height<={h}]+bestaudio/best[height<={h}]",
            h = height
        ),
        ResolvedQuality::Best { .. } => "bestvideo[ext=mp4]+bestaudio[ext=m4a]/best[ext=mp4]/best".to_string(),
    }
}

/// Broadened selector for the single retry after "requested format is not available"
pub fn fallback_selector(resolved: &ResolvedQuality) -> String {
    match resolved {
        ResolvedQuality::Audio => "ba/b".to_string(),
        ResolvedQuality::Height { height, .. } => format!("bv*[height<={h}]+ba/b[height<={h}]/bv*+ba/b", h = height),
        ResolvedQuality::Best { .. } => "bv*+ba/b".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const HEIGHTS: [u32; 5] = [144, 360, 480, 720, 1080];

    #[test]
    fn test_parse() {
        assert_eq!(Quality::parse("720"), Some(Quality::Height(720)));
        assert_eq!(Quality::parse("480p"), Some(Quality::Height(480)));
        assert_eq!(Quality::parse("BEST"), Some(Quality::Best));
        assert_eq!(Quality::parse("mp3"), Some(Quality::Mp3));
        assert_eq!(Quality::parse("0"), None);
        assert_eq!(Quality::parse("hd"), None);
    }

    #[test]
    fn test_code_roundtrips_offered_qualities() {
        for q in OFFERED_QUALITIES {
            assert_eq!(Quality::parse(&q.code()), Some(q));
        }
    }

    #[test]
    fn test_exact_height() {
        assert_eq!(
            resolve_quality(Quality::Height(720), &HEIGHTS),
            ResolvedQuality::Height {
                requested: 720,
                height: 720,
                exact: true
            }
        );
        assert!(!resolve_quality(Quality::Height(720), &HEIGHTS).is_adjusted());
    }

    #[test]
    fn test_closest_lower_height() {
        let resolved = resolve_quality(Quality::Height(600), &HEIGHTS);
        assert_eq!(
            resolved,
            ResolvedQuality::Height {
                requested: 600,
                height: 480,
                exact: false
            }
        );
        assert!(resolved.is_adjusted());
        assert_eq!(resolved.label(), "480p");

        // An offered tier steps down even when it is above everything advertised
        assert_eq!(
            resolve_quality(Quality::Height(720), &[360, 480]),
            ResolvedQuality::Height {
                requested: 720,
                height: 480,
                exact: false
            }
        );
    }

    #[test]
    fn test_request_above_everything_uses_best() {
        let resolved = resolve_quality(Quality::Height(2000), &HEIGHTS);
        assert_eq!(resolved, ResolvedQuality::Best { requested: Some(2000) });
        assert!(resolved.is_adjusted());

        assert_eq!(
            resolve_quality(Quality::Height(1440), &[360, 480, 720]),
            ResolvedQuality::Best { requested: Some(1440) }
        );
    }

    #[test]
    fn test_nothing_lower_or_empty_uses_best() {
        assert_eq!(
            resolve_quality(Quality::Height(360), &[]),
            ResolvedQuality::Best { requested: Some(360) }
        );
        // 100 is below every advertised height and not advertised itself
        assert_eq!(
            resolve_quality(Quality::Height(100), &HEIGHTS),
            ResolvedQuality::Best { requested: Some(100) }
        );
    }

    #[test]
    fn test_best_and_audio_are_never_adjusted() {
        assert!(!resolve_quality(Quality::Best, &HEIGHTS).is_adjusted());
        assert!(!resolve_quality(Quality::Mp3, &[]).is_adjusted());
    }

    #[test]
    fn test_selectors() {
        let resolved = resolve_quality(Quality::Height(480), &HEIGHTS);
        assert!(format_selector(&resolved).starts_with("bestvideo[height<=480][ext=mp4]"));
        assert_eq!(fallback_selector(&resolved), "bv*[height<=480]+ba/b[height<=480]/bv*+ba/b");
        assert_eq!(format_selector(&ResolvedQuality::Audio), "bestaudio/best");
        assert_eq!(fallback_selector(&ResolvedQuality::Best { requested: None }), "bv*+ba/b");
    }
}
