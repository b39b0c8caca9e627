//! End-to-end conversion of saved HTML pages.

use chatdown::{ExportService, Page};
use chrono::{DateTime, TimeZone, Utc};

const LOCATION: &str = "https://claude.ai/chat/abc";

fn at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap()
}

fn page(body: &str) -> Page {
    let html = format!("<html><head><title>Sorting - Claude</title></head><body>{body}</body></html>");
    Page::from_html(&html, LOCATION)
}

fn export(body: &str) -> String {
    ExportService::new().export(&page(body), at())
}

const HEADER: &str =
    "[Exported from Claude.ai on 2024-05-01 10:00:00](https://claude.ai/chat/abc)\n\n";

fn user_group(attachment: Option<&str>, message: &str) -> String {
    let block = attachment
        .map(|name| {
            format!(
                r#"<div class="att"><div data-testid="file-thumbnail"><h3>{name}</h3><p>12 lines</p></div></div>"#
            )
        })
        .unwrap_or_default();
    format!(
        r#"<div class="group">{block}<div class="wrap"><div class="font-user-message">{message}</div></div></div>"#
    )
}

fn assistant_group(inner: &str) -> String {
    format!(r#"<div class="group"><div class="font-claude-response">{inner}</div></div>"#)
}

#[test]
fn test_full_conversation() {
    let body = [
        user_group(Some("data.csv"), "<p>Sort this *file*</p>"),
        assistant_group(concat!(
            r#"<div class="artifact-block-cell"><div class="leading-tight text-sm">sort.py</div></div>"#,
            r#"<div class="standard-markdown">"#,
            "<h2>Approach</h2>",
            "<p>Use <code>sorted()</code>:</p>",
            r#"<div><div class="text-text-500 font-small">python</div>"#,
            r#"<pre><code class="language-python">rows = sorted(rows)</code></pre></div>"#,
            "<ul><li>fast</li><li>stable</li></ul>",
            "</div>",
        )),
        user_group(None, "<p>Thanks</p><div><pre><code>x</code></pre></div><p>bye</p>"),
    ]
    .concat();

    let expected = [
        HEADER,
        "> 🗣️ User 🗣️\n>\n> **Attachments**:\n> - data.csv (12 lines)\n>\n",
        "> Sort this \\*file\\*\n\n",
        "**Artifacts**:\n- sort.py\n",
        "## Approach\n\nUse `sorted()`:\n\n",
        "```python\nrows = sorted(rows)\n```\n\n",
        "- fast\n- stable\n\n",
        "> 🗣️ User 🗣️\n>\n> Thanks\n\n",
        "```\nx\n```\n\n",
        "> 🗣️ User 🗣️\n>\n> bye",
    ]
    .concat();

    assert_eq!(export(&body), expected);
}

#[test]
fn test_attachments_stay_with_their_turn() {
    let body = [
        user_group(Some("first.txt"), "<p>one</p>"),
        user_group(Some("second.txt"), "<p>two</p>"),
        user_group(None, "<p>three</p>"),
    ]
    .concat();
    let md = export(&body);

    let one = md.find("> one").unwrap();
    let two = md.find("> two").unwrap();
    let three = md.find("> three").unwrap();
    let first = md.find("first.txt").unwrap();
    let second = md.find("second.txt").unwrap();

    assert!(first < one);
    assert!(one < second && second < two);
    assert_eq!(md.matches("**Attachments**").count(), 2);
    assert!(!md[two..three].contains("Attachments"));
}

#[test]
fn test_language_label_before_paragraph_kept() {
    let body = assistant_group(concat!(
        r#"<div class="standard-markdown">"#,
        r#"<div class="text-text-500 font-small">python</div><p>is a language</p>"#,
        "</div>",
    ));
    assert_eq!(export(&body), format!("{HEADER}pythonis a language"));
}

#[test]
fn test_table_and_links() {
    let body = assistant_group(concat!(
        r#"<div class="standard-markdown">"#,
        r#"<p>See <a href="/files/1">the doc</a> and <a href="https://example.com/x">this</a>.</p>"#,
        "<pre><table><thead><tr><th>X</th><th>Y</th></tr></thead>",
        "<tbody><tr><td>1</td><td><strong>2</strong></td></tr></tbody></table></pre>",
        "</div>",
    ));
    let expected = format!(
        "{HEADER}See [the doc](https://claude.ai/files/1) and [this](https://example.com/x).\n\n\
         | X | Y |\n| --- | --- |\n| 1 | **2** |"
    );
    assert_eq!(export(&body), expected);
}

#[test]
fn test_quoted_reply_and_bold_numbering() {
    let body = [
        user_group(None, "<blockquote>earlier answer</blockquote><p>why?</p>"),
        assistant_group(concat!(
            r#"<div class="standard-markdown">"#,
            "<p><strong>1. Install:</strong> run it</p>",
            "<ol><li>a</li><li>b</li></ol>",
            "</div>",
        )),
    ]
    .concat();
    let expected = format!(
        "{HEADER}> 🗣️ User 🗣️\n>\n> > earlier answer\n>\n> why?\n\n\
         1. **Install:** run it\n\n1. a\n1. b"
    );
    assert_eq!(export(&body), expected);
}

#[test]
fn test_angle_bracket_before_code_survives() {
    let body = user_group(
        None,
        "<p>Use Vec&lt;u8&gt;</p><div><pre><code>x</code></pre></div>",
    );
    let expected = format!("{HEADER}> 🗣️ User 🗣️\n>\n> Use Vec<u8>\n\n```\nx\n```");
    assert_eq!(export(&body), expected);
}

#[test]
fn test_untitled_cards_keep_labels() {
    let body = [
        format!(
            r#"<div class="group"><div class="att"><div data-testid="file-thumbnail"><p>photo</p></div></div>{}</div>"#,
            r#"<div class="wrap"><div class="font-user-message"><p>look</p></div></div>"#
        ),
        assistant_group(concat!(
            r#"<div class="artifact-block-cell"><span>no title</span></div>"#,
            r#"<div class="standard-markdown"><p>Done.</p></div>"#,
        )),
    ]
    .concat();
    let expected = format!(
        "{HEADER}> 🗣️ User 🗣️\n>\n> **Attachments**:\n>\n> look\n\n**Artifacts**:\n\nDone."
    );
    assert_eq!(export(&body), expected);
}

#[test]
fn test_empty_page() {
    assert_eq!(export(""), HEADER.trim_end());
}

#[test]
fn test_file_name_and_save() {
    let dir = tempfile::tempdir().unwrap();
    let service = ExportService::new();
    let page = page(&user_group(None, "<p>hi</p>"));
    let md = service.export(&page, at());
    let path = service.save(&page, &md, dir.path()).unwrap();
    assert_eq!(path, dir.path().join("Sorting.md"));
    assert!(std::fs::read_to_string(&path).unwrap().ends_with("> hi\n"));
}
