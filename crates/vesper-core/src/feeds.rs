//! Feed discovery
//!
//! After each full page load a small script collects RSS/Atom `<link>`s as
//! HTML list items. The location field offers them as a generated page.

/// Evaluates to a string of `<li>` items, or `null` when the page has no feeds
pub const FEED_DISCOVERY_SCRIPT: &str = r#"
a = document.querySelectorAll(
    'html > head > link[rel="alternate"][href][type="application/atom+xml"],' +
    'html > head > link[rel="alternate"][href][type="application/rss+xml"]'
);
if (a.length == 0)
    null;
else
{
    out = '';
    for (i = 0; i < a.length; i++)
    {
        url = encodeURIComponent(a[i].href);
        if ('title' in a[i] && a[i].title != '')
            title = encodeURIComponent(a[i].title);
        else
            title = url;
        out += '<li><a href="' + url + '">' + title + '</a></li>';
    }
    out;
}
"#;

/// A `data:` URI listing the feeds, loaded like any other page
pub fn feed_page(feed_html: &str) -> String {
    format!(
        "data:text/html,<!DOCTYPE html><html><head><meta charset=\"UTF-8\">\
         <title>Feeds</title></head><body><p>Feeds found on this page:</p>\
         <ul>{}</ul></body></html>",
        feed_html
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feed_page() {
        let page = feed_page("<li><a href=\"x\">x</a></li>");
        assert!(page.starts_with("data:text/html,"));
        assert!(page.contains("<ul><li><a href=\"x\">x</a></li></ul>"));
    }
}
