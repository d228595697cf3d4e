//! Static SEO metadata for the public pages, keyed by page file name.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::OnceLock;
use tera::Context;

use crate::helper::public_helpers::PageRenderer;

const SEO_JSON: &str = include_str!("../../assets/seo.json");
const DEFAULT_PAGE: &str = "index.html";

pub(crate) const HEAD_TEMPLATE: &str = r#"<title>{{ meta.title }}</title>
<meta name="description" content="{{ meta.description }}">
<meta name="keywords" content="{{ meta.keywords }}">
<meta name="author" content="{{ meta.author }}">
<link rel="canonical" href="{{ meta.canonical_url }}">
<meta property="og:type" content="website">
<meta property="og:title" content="{{ meta.title }}">
<meta property="og:description" content="{{ meta.description }}">
<meta property="og:url" content="{{ meta.canonical_url }}">
<meta property="og:image" content="{{ meta.image }}">
<meta property="og:locale" content="{{ meta.locale }}">
<meta property="og:site_name" content="{{ meta.site_name }}">
"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lang {
    Ar,
    En,
}

impl Lang {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "ar" => Some(Lang::Ar),
            "en" => Some(Lang::En),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeoConfig {
    pub site_name: String,
    pub site_name_en: String,
    pub site_description: String,
    pub site_description_en: String,
    pub site_url: String,
    pub site_logo: String,
    pub organization: Organization,
    pub default_meta: DefaultMeta,
    pub pages: BTreeMap<String, PageEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub name: String,
    pub name_en: String,
    pub founding_date: String,
    pub contact: Contact,
    #[serde(default)]
    pub social_media: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
pub struct Contact {
    pub telephone: String,
    pub email: String,
    pub website: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefaultMeta {
    pub keywords: String,
    pub keywords_en: String,
    pub author: String,
    pub language: String,
    pub locale: String,
    pub locale_en: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageEntry {
    pub title: String,
    pub title_en: String,
    pub description: String,
    pub description_en: String,
}

/// Metadata resolved for one page in one language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageMeta {
    pub title: &'static str,
    pub description: &'static str,
    pub keywords: &'static str,
    pub author: &'static str,
    pub locale: &'static str,
    pub site_name: &'static str,
    pub canonical_url: String,
    pub image: &'static str,
}

pub fn seo_config() -> &'static SeoConfig {
    static CONFIG: OnceLock<SeoConfig> = OnceLock::new();
    CONFIG.get_or_init(|| serde_json::from_str(SEO_JSON).expect("embedded SEO table is valid JSON"))
}

/// `"/site/courses.html"`, `"courses.html"` and `"courses.html?x=1"` all name `courses.html`;
/// an empty last segment is the home page.
pub fn normalize_page(path: &str) -> &str {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    match path.rsplit('/').next() {
        Some(name) if !name.is_empty() => name,
        _ => DEFAULT_PAGE,
    }
}

/// Page metadata, falling back to the site-wide title and description for unknown pages.
pub fn page_meta(page: &str, lang: Lang) -> PageMeta {
    let config = seo_config();
    let name = normalize_page(page);
    let entry = config.pages.get(name);

    let (title, description) = match (entry, lang) {
        (Some(e), Lang::Ar) => (e.title.as_str(), e.description.as_str()),
        (Some(e), Lang::En) => (e.title_en.as_str(), e.description_en.as_str()),
        (None, Lang::Ar) => (config.site_name.as_str(), config.site_description.as_str()),
        (None, Lang::En) => (config.site_name_en.as_str(), config.site_description_en.as_str()),
    };
    let meta = &config.default_meta;
    let (keywords, locale, site_name) = match lang {
        Lang::Ar => (meta.keywords.as_str(), meta.locale.as_str(), config.site_name.as_str()),
        Lang::En => (meta.keywords_en.as_str(), meta.locale_en.as_str(), config.site_name_en.as_str()),
    };

    PageMeta {
        title,
        description,
        keywords,
        author: meta.author.as_str(),
        locale,
        site_name,
        canonical_url: format!("{}/{}", config.site_url.trim_end_matches('/'), name),
        image: config.site_logo.as_str(),
    }
}

/// Head markup for a page: title, description, keywords, canonical link and Open Graph tags.
pub fn head_tags(renderer: &PageRenderer, page: &str, lang: Lang) -> String {
    let mut context = Context::new();
    context.insert("meta", &page_meta(page, lang));
    renderer.render_or_log("head.html", &context)
}
