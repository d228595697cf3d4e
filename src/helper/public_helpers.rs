//! Markup for the public pages, built from published records.
//!
//! Every section falls back to an empty-state block when its data call fails, so a
//! backend outage renders an emptier page, never a broken one.

use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;
use tera::{Context, Tera};

use crate::helper::sanitization_helpers::{excerpt, strip_tags};
use crate::helper::seo_helpers::HEAD_TEMPLATE;
use crate::helper::youtube_helpers::{extract_youtube_id, youtube_embed_url};
use crate::models::db_operations::ContentFacade;
use crate::models::{ContentKind, ContentRecord, MediaKind, MediaRecord};

const EXCERPT_CHARS: usize = 100;
const PREVIEW_LIMIT: u32 = 3;
const GALLERY_PAGE_SIZE: u32 = 50;

const ARABIC_MONTHS: [&str; 12] = [
    "يناير", "فبراير", "مارس", "أبريل", "مايو", "يونيو",
    "يوليو", "أغسطس", "سبتمبر", "أكتوبر", "نوفمبر", "ديسمبر",
];

const CARDS_TEMPLATE: &str = r#"{% for item in items %}
<div class="bg-white rounded-lg shadow-lg overflow-hidden hover:shadow-xl transition">
    {% if item.image_url %}<img src="{{ item.image_url }}" alt="{{ item.title }}" class="w-full h-48 object-cover">{% else %}<div class="bg-amber-200 h-48 flex items-center justify-center">
        <i class="fas {{ icon }} text-5xl text-amber-700"></i>
    </div>{% endif %}
    <div class="p-6">
        <span class="text-amber-600 text-sm">{{ item.date }}</span>
        <h3 class="text-xl font-bold text-amber-900 mt-2 mb-3">{{ item.title }}</h3>
        <p class="text-gray-600 mb-4">{{ item.excerpt }}</p>
        {% if item.link %}<a href="{{ item.link }}" class="text-amber-700 hover:text-amber-900 font-semibold">اقرأ المزيد <i class="fas fa-arrow-left"></i></a>{% endif %}
    </div>
</div>
{% endfor %}"#;

const EMPTY_TEMPLATE: &str = r#"<div class="col-span-full text-center py-8">
    <p class="text-gray-600">{{ message }}</p>
</div>"#;

const GALLERY_TEMPLATE: &str = r#"{% for item in items %}
<figure class="rounded-lg overflow-hidden shadow">
    {% if item.embed_url %}<iframe src="{{ item.embed_url }}" title="{{ item.title }}" class="w-full h-56" frameborder="0" allowfullscreen></iframe>{% else %}<img src="{{ item.src }}" alt="{{ item.title }}" class="w-full h-56 object-cover">{% endif %}
    {% if item.title %}<figcaption class="p-2 text-sm text-gray-700">{{ item.title }}</figcaption>{% endif %}
</figure>
{% endfor %}"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublicPage {
    Home,
    Courses,
    Achievements,
    Gallery,
}

impl PublicPage {
    pub fn from_path(path: &str) -> Option<Self> {
        if path.contains("index.html") || path == "/" || path.ends_with('/') {
            Some(PublicPage::Home)
        } else if path.contains("courses.html") {
            Some(PublicPage::Courses)
        } else if path.contains("achievements.html") {
            Some(PublicPage::Achievements)
        } else if path.contains("gallery.html") {
            Some(PublicPage::Gallery)
        } else {
            None
        }
    }
}

/// One filled-in container of a page, addressed by the element id it replaces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    pub id: &'static str,
    pub html: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedPage {
    pub sections: Vec<Section>,
}

#[derive(Debug, Serialize)]
struct CardView {
    title: String,
    date: String,
    excerpt: String,
    image_url: Option<String>,
    link: Option<String>,
}

#[derive(Debug, Serialize)]
struct GalleryView {
    title: String,
    src: Option<String>,
    embed_url: Option<String>,
}

/// Long Arabic date with Gregorian month names, e.g. `1 مارس 2024`.
pub fn format_arabic_date(date: &DateTime<Utc>) -> String {
    let month = ARABIC_MONTHS[date.month0() as usize];
    format!("{} {} {}", date.day(), month, date.year())
}

pub struct PageRenderer {
    tera: Tera,
}

impl PageRenderer {
    pub fn new() -> Result<Self, tera::Error> {
        let mut tera = Tera::default();
        tera.add_raw_templates(vec![
            ("cards.html", CARDS_TEMPLATE),
            ("empty.html", EMPTY_TEMPLATE),
            ("gallery.html", GALLERY_TEMPLATE),
            ("head.html", HEAD_TEMPLATE),
        ])?;
        Ok(Self { tera })
    }

    pub(crate) fn render_or_log(&self, template: &str, context: &Context) -> String {
        self.tera.render(template, context).unwrap_or_else(|err| {
            log::error!("Template rendering error: {}", err);
            String::new()
        })
    }

    pub fn empty_state(&self, message: &str) -> String {
        let mut context = Context::new();
        context.insert("message", message);
        self.render_or_log("empty.html", &context)
    }

    /// Cards for content records; `link_base` (e.g. `news-article.html`) adds a `?id=` link.
    pub fn content_cards(&self, records: &[ContentRecord], icon: &str, link_base: Option<&str>) -> String {
        let items: Vec<CardView> = records
            .iter()
            .map(|item| CardView {
                title: strip_tags(&item.title),
                date: format_arabic_date(&item.created_at),
                excerpt: item
                    .description
                    .as_deref()
                    .map(|d| excerpt(d, EXCERPT_CHARS))
                    .unwrap_or_default(),
                image_url: item.image_url.clone().filter(|u| !u.is_empty()),
                link: link_base.map(|base| format!("{}?id={}", base, item.id)),
            })
            .collect();

        let mut context = Context::new();
        context.insert("items", &items);
        context.insert("icon", icon);
        self.render_or_log("cards.html", &context)
    }

    pub fn gallery_items(&self, records: &[MediaRecord]) -> String {
        let items: Vec<GalleryView> = records
            .iter()
            .filter_map(|item| {
                let title = item.title.as_deref().map(strip_tags).unwrap_or_default();
                match item.kind()? {
                    MediaKind::Video => {
                        let id = extract_youtube_id(item.url.as_deref()?)?;
                        Some(GalleryView { title, src: None, embed_url: Some(youtube_embed_url(&id)) })
                    }
                    MediaKind::Image => Some(GalleryView { title, src: Some(item.url.clone()?), embed_url: None }),
                    MediaKind::Audio => None,
                }
            })
            .collect();

        let mut context = Context::new();
        context.insert("items", &items);
        self.render_or_log("gallery.html", &context)
    }
}

async fn content_section(
    facade: &ContentFacade,
    renderer: &PageRenderer,
    kind: ContentKind,
    limit: Option<u32>,
    icon: &str,
    link_base: Option<&str>,
    empty_message: &str,
) -> String {
    match facade.get_public_content(kind, limit).await {
        Ok(records) if !records.is_empty() => renderer.content_cards(&records, icon, link_base),
        _ => renderer.empty_state(empty_message),
    }
}

/// The three latest published news items.
pub async fn render_news_section(facade: &ContentFacade, renderer: &PageRenderer) -> String {
    content_section(
        facade,
        renderer,
        ContentKind::News,
        Some(PREVIEW_LIMIT),
        "fa-newspaper",
        Some("news-article.html"),
        "لا توجد أخبار حالياً",
    )
    .await
}

async fn render_courses_section(facade: &ContentFacade, renderer: &PageRenderer, limit: Option<u32>) -> String {
    content_section(facade, renderer, ContentKind::Courses, limit, "fa-book-open", None, "لا توجد دورات حالياً").await
}

/// Achievements are published as news items.
async fn render_achievements_section(facade: &ContentFacade, renderer: &PageRenderer, limit: Option<u32>) -> String {
    content_section(
        facade,
        renderer,
        ContentKind::News,
        limit,
        "fa-trophy",
        Some("news-article.html"),
        "لا توجد إنجازات حالياً",
    )
    .await
}

async fn render_gallery_section(facade: &ContentFacade, renderer: &PageRenderer) -> String {
    let mut items = Vec::new();
    for kind in [MediaKind::Image, MediaKind::Video] {
        if let Ok(page) = facade.list_media(Some(kind), 1, GALLERY_PAGE_SIZE).await {
            items.extend(page.data);
        }
    }
    items.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    if items.is_empty() {
        return renderer.empty_state("لا توجد وسائط حالياً");
    }
    renderer.gallery_items(&items)
}

pub async fn load_page(facade: &ContentFacade, renderer: &PageRenderer, page: PublicPage) -> RenderedPage {
    let sections = match page {
        PublicPage::Home => vec![
            Section { id: "newsSection", html: render_news_section(facade, renderer).await },
            Section {
                id: "coursesSection",
                html: render_courses_section(facade, renderer, Some(PREVIEW_LIMIT)).await,
            },
            Section {
                id: "achievementsSection",
                html: render_achievements_section(facade, renderer, Some(PREVIEW_LIMIT)).await,
            },
        ],
        PublicPage::Courses => vec![Section {
            id: "coursesSection",
            html: render_courses_section(facade, renderer, None).await,
        }],
        PublicPage::Achievements => vec![Section {
            id: "achievementsSection",
            html: render_achievements_section(facade, renderer, None).await,
        }],
        PublicPage::Gallery => vec![Section {
            id: "gallerySection",
            html: render_gallery_section(facade, renderer).await,
        }],
    };
    RenderedPage { sections }
}
