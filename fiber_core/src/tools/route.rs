//! URL path to page resolution.

use serde::Serialize;

use super::ToolDescriptor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LegalPage {
    Privacy,
    Terms,
    Cookies,
    Accessibility,
    DoNotSell,
    About,
    Contact,
}

impl LegalPage {
    pub const ALL: [LegalPage; 7] = [
        LegalPage::Privacy,
        LegalPage::Terms,
        LegalPage::Cookies,
        LegalPage::Accessibility,
        LegalPage::DoNotSell,
        LegalPage::About,
        LegalPage::Contact,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            LegalPage::Privacy => "privacy",
            LegalPage::Terms => "terms",
            LegalPage::Cookies => "cookies",
            LegalPage::Accessibility => "accessibility",
            LegalPage::DoNotSell => "do-not-sell",
            LegalPage::About => "about",
            LegalPage::Contact => "contact",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "page", content = "target", rename_all = "snake_case")]
pub enum Route {
    Home,
    Tool(&'static ToolDescriptor),
    Blog(String),
    Legal(LegalPage),
    NotFound,
}

impl Route {
    /// Resolve a path such as `/gauge-calculator/?ref=nav`.
    pub fn resolve(path: &str) -> Route {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            [] => Route::Home,
            ["blog"] => Route::Blog(String::new()),
            ["blog", post] => Route::Blog(post.to_string()),
            [single] => {
                if let Some(page) = LegalPage::ALL.into_iter().find(|p| p.path() == *single) {
                    return Route::Legal(page);
                }
                match super::find(single) {
                    Ok(tool) => Route::Tool(tool),
                    Err(_) => Route::NotFound,
                }
            }
            _ => Route::NotFound,
        }
    }

    /// The tool this route makes active, if any
    pub fn active_tool(&self) -> Option<&'static ToolDescriptor> {
        match self {
            Route::Tool(tool) => Some(tool),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_home_and_tools() {
        assert_eq!(Route::resolve("/"), Route::Home);
        assert_eq!(Route::resolve(""), Route::Home);
        let route = Route::resolve("/gauge-calculator/?utm=x");
        assert_eq!(route.active_tool().map(|t| t.slug), Some("gauge-calculator"));
    }

    #[test]
    fn test_blog_and_legal() {
        assert_eq!(Route::resolve("/blog/blocking-101"), Route::Blog("blocking-101".to_string()));
        assert_eq!(Route::resolve("/blog"), Route::Blog(String::new()));
        assert_eq!(Route::resolve("/do-not-sell"), Route::Legal(LegalPage::DoNotSell));
        assert_eq!(Route::resolve("/privacy#ads"), Route::Legal(LegalPage::Privacy));
    }

    #[test]
    fn test_not_found() {
        assert_eq!(Route::resolve("/nope"), Route::NotFound);
        assert_eq!(Route::resolve("/gauge-calculator/extra"), Route::NotFound);
        assert!(Route::resolve("/about").active_tool().is_none());
    }
}
