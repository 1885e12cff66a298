use crate::uri::display_path;

/// 生成目录列表页面
pub struct HtmlBuilder {
    title: String,
    css: String,
    body: String,
}

impl HtmlBuilder {
    /// `path` 是目录自身的路径段，`names` 为子节点名称，按给定顺序输出。
    /// 链接使用绝对路径，与请求目录是否以 `/` 结尾无关。
    pub fn from_listing<'a>(path: &[String], names: impl IntoIterator<Item = &'a str>) -> Self {
        let base = display_path(path);
        let prefix = base.trim_end_matches('/');
        let mut body = String::new();
        for name in names {
            let name = escape_html(name);
            body.push_str(&format!(
                "<p><a href='{}/{}'>{}</a></p>",
                prefix, name, name
            ));
        }
        let css = r"
            body {
                width: 35em;
                margin: 0 auto;
                font-family: Tahoma, Verdana, Arial, sans-serif;
            }"
        .to_string();
        Self {
            title: format!("Directory {}", escape_html(&base)),
            css,
            body,
        }
    }

    pub fn build(&self) -> String {
        format!(
            r##"<!DOCTYPE html>
<html>
    <head>
        <meta charset="utf-8">
        <title>{}</title>
        <style>{}</style>
    </head>
    <body>{}</body>
</html>"##,
            self.title, self.css, self.body
        )
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '&' => escaped.push_str("&amp;"),
            '\'' => escaped.push_str("&#39;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_listing() {
        let html = HtmlBuilder::from_listing(&[], ["interface", "places"]).build();
        assert!(html.contains("<title>Directory /</title>"));
        assert!(html.contains("<p><a href='/interface'>interface</a></p>"));
        assert!(html.find("interface").unwrap() < html.find("places").unwrap());
    }

    #[test]
    fn test_nested_listing() {
        let path = vec!["api".to_string(), "v1".to_string()];
        let html = HtmlBuilder::from_listing(&path, ["characters"]).build();
        assert!(html.contains("<title>Directory /api/v1</title>"));
        assert!(html.contains("href='/api/v1/characters'"));
    }

    #[test]
    fn test_names_are_escaped() {
        let html = HtmlBuilder::from_listing(&[], ["<b>"]).build();
        assert!(html.contains("&lt;b&gt;"));
        assert!(!html.contains("<b>"));
    }

    #[test]
    fn test_html_builder_structure() {
        let html = HtmlBuilder::from_listing(&[], []).build();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<head>"));
        assert!(html.contains("<body></body>"));
        assert!(html.contains("charset=\"utf-8\""));
        assert!(html.ends_with("</html>"));
    }
}
