//! Instructions printed when every automated path has failed.

use std::path::Path;

const RULE: &str = "============================================================";

/// Step-by-step browser instructions for pulling the video URL by hand.
///
/// `page_url` is shown truncated to 80 characters; the yt-dlp command
/// targets `output_dir`.
#[must_use]
pub fn manual_instructions(page_url: &str, output_dir: &Path) -> String {
    let shown: String = page_url.chars().take(80).collect();
    let output_dir = output_dir.display();

    format!(
        r#"
{RULE}
MANUAL VIDEO EXTRACTION INSTRUCTIONS
{RULE}

The page loads its video with JavaScript, which needs a real browser.
Follow these steps:

1. OPEN THE PAGE
   Open this URL in Chrome or Firefox:
   {shown}...

2. OPEN DEVELOPER TOOLS
   - Press F12 (or Ctrl+Shift+I / Cmd+Option+I on Mac)
   - Click on the "Network" tab

3. FILTER FOR VIDEO
   - In the filter box, type: mp4 OR m3u8 OR video
   - Or click the "Media" filter if available

4. PLAY THE VIDEO
   - Click play on the video player
   - Watch the Network tab for new requests

5. FIND THE VIDEO URL
   - Look for requests to .mp4, .m3u8, or video domains
   - Common video hosts: wistia, vimeo, youtube, brightcove
   - Right-click the request -> "Copy" -> "Copy URL"

6. DOWNLOAD THE VIDEO
   Run this command with the copied URL:

   vidgrab "PASTE_VIDEO_URL_HERE"

   Or use yt-dlp directly:

   yt-dlp "PASTE_VIDEO_URL_HERE" -P "{output_dir}"

{RULE}
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_includes_page_url() {
        let text = manual_instructions("https://example.com/promo", Path::new("downloads"));
        assert!(text.contains("https://example.com/promo..."));
        assert!(text.contains("MANUAL VIDEO EXTRACTION INSTRUCTIONS"));
        assert!(text.contains("vidgrab \"PASTE_VIDEO_URL_HERE\""));
        assert!(text.contains("-P \"downloads\""));
    }

    #[test]
    fn test_truncates_long_url_on_char_boundary() {
        let url = format!("https://example.com/{}", "é".repeat(200));
        let text = manual_instructions(&url, Path::new("downloads"));
        let shown: String = url.chars().take(80).collect();
        assert!(text.contains(&format!("{shown}...")));
        assert!(!text.contains(&url));
    }

    #[test]
    fn test_command_uses_configured_output_dir() {
        let text = manual_instructions("https://example.com/promo", Path::new("/srv/videos"));
        assert!(text.contains(r#"yt-dlp "PASTE_VIDEO_URL_HERE" -P "/srv/videos""#));
        assert!(!text.contains("./downloads"));
    }
}
