/// Module for analyzing yt-dlp errors
///
/// Maps yt-dlp diagnostic output onto a closed set of failure types. The
/// matching is plain lower-case substring search, kept in one pure function so
/// it can be tested against captured output.
/// yt-dlp error types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YtDlpErrorType {
    /// Sign-in or valid cookies required (age gate, bot check, expired cookies)
    AuthRequired,
    /// Private or members-only content
    PrivateOrMembersOnly,
    /// Removed, blocked or otherwise unavailable
    Unavailable,
    /// The requested format selector matched nothing
    FormatUnavailable,
    /// Output would exceed `--max-filesize`
    FileTooLarge,
    /// The filesystem rejected the output name
    FilenameTooLong,
    /// Unknown error
    Unknown,
}

/// Analyzes yt-dlp output and determines the error type
///
/// Pass stderr, or stderr and stdout concatenated: the max-filesize notice is
/// printed on stdout.
pub fn analyze_ytdlp_error(output: &str) -> YtDlpErrorType {
    let output_lower = output.to_lowercase();

    if output_lower.contains("larger than max-filesize") || output_lower.contains("file is larger than") {
        return YtDlpErrorType::FileTooLarge;
    }

    if output_lower.contains("file name too long")
        || output_lower.contains("filename too long")
        || output_lower.contains("errno 36")
        || output_lower.contains("errno 63")
    {
        return YtDlpErrorType::FilenameTooLong;
    }

    if output_lower.contains("requested format is not available")
        || output_lower.contains("requested format not available")
        || output_lower.contains("no video formats found")
    {
        return YtDlpErrorType::FormatUnavailable;
    }

    // Checked before auth: the private-video message also asks to sign in
    if output_lower.contains("private video")
        || output_lower.contains("video is private")
        || output_lower.contains("members-only")
        || output_lower.contains("members only")
        || output_lower.contains("join this channel")
        || output_lower.contains("available to this channel's members")
    {
        return YtDlpErrorType::PrivateOrMembersOnly;
    }

    if output_lower.contains("sign in to confirm")
        || output_lower.contains("please sign in")
        || output_lower.contains("login required")
        || output_lower.contains("requires authentication")
        || output_lower.contains("cookies are no longer valid")
        || output_lower.contains("use --cookies-from-browser")
        || output_lower.contains("use --cookies for the authentication")
        || output_lower.contains("age-restricted")
    {
        return YtDlpErrorType::AuthRequired;
    }

    if output_lower.contains("video unavailable")
        || output_lower.contains("this video is not available")
        || output_lower.contains("video is not available")
        || output_lower.contains("has been removed")
        || output_lower.contains("does not exist")
        || output_lower.contains("not available in your country")
        || output_lower.contains("http error 404")
        || output_lower.contains("unsupported url")
    {
        return YtDlpErrorType::Unavailable;
    }

    YtDlpErrorType::Unknown
}

/// Returns the most informative line of yt-dlp output for logs
///
/// Prefers the last `ERROR:` line, falls back to the last non-empty line.
pub fn summarize_output(output: &str) -> String {
    let lines: Vec<&str> = output.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
    lines
        .iter()
        .rev()
        .find(|l| l.starts_with("ERROR:"))
        .or_else(|| lines.last())
        .map(|l| l.to_string())
        .unwrap_or_else(|| "no output".to_string())
}
