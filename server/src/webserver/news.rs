use std::time::Duration;

use newsagent_api::schema::Article;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use rocket::{
    form::Form,
    request::FlashMessage,
    response::{status::NotFound, Flash, Redirect},
    serde::json::Json,
    State,
};
use rocket_dyn_templates::Template;
use serde::{Deserialize, Serialize};

use crate::{
    configuration::{Configuration, PreviewWordCount, RefreshDelayMillis},
    search::location_for,
    webserver::{
        localization::{localize, UserLanguage},
        Notice, RequestData, SharedSource,
    },
};

const ELLIPSIS: &str = "...";

const SLUG_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'\'')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'#')
    .add(b'?')
    .add(b'{')
    .add(b'}')
    .add(b'/')
    .add(b'%')
    .add(b'&');

/// The slug as it appears in `/news/<slug>`. The result contains nothing
/// that html escaping would change.
pub fn slug_segment(slug: &str) -> String {
    utf8_percent_encode(slug, SLUG_SEGMENT).to_string()
}

/// Keeps the articles whose title, content or slug contains `term`, ignoring
/// case. An empty term keeps everything.
pub fn filter_articles<'a>(articles: &'a [Article], term: &str) -> Vec<&'a Article> {
    let term = term.to_lowercase();
    articles
        .iter()
        .filter(|article| {
            article.title.to_lowercase().contains(&term)
                || article.content.to_lowercase().contains(&term)
                || article.slug.to_lowercase().contains(&term)
        })
        .collect()
}

/// Cuts `content` down to its first `word_count` space separated words.
pub fn preview(content: &str, word_count: usize) -> String {
    let words = content.split(' ').collect::<Vec<_>>();
    if words.len() > word_count {
        let mut preview = words[..word_count].join(" ");
        preview.push_str(ELLIPSIS);
        preview
    } else {
        content.to_owned()
    }
}

fn refresh_after_seconds(delay: Duration) -> u64 {
    // Refresh directives only have whole second resolution; never refresh early.
    let seconds = delay.as_secs();
    if delay.subsec_nanos() > 0 {
        seconds.saturating_add(1)
    } else {
        seconds
    }
}

#[derive(Serialize)]
struct ArticleCard<'a> {
    topic: &'a str,
    title: &'a str,
    slug: String,
    preview: String,
}

#[derive(Serialize)]
struct ListNewsContext<'a> {
    request: RequestData,
    articles: Vec<ArticleCard<'a>>,
    refresh_after: Option<u64>,
}

#[get("/?<search>")]
pub async fn list_news(
    search: Option<String>,
    language: UserLanguage,
    flash: Option<FlashMessage<'_>>,
    source: &State<SharedSource>,
) -> Template {
    let mut notices = flash
        .as_ref()
        .and_then(Notice::from_flash)
        .into_iter()
        .collect::<Vec<_>>();

    let articles = match source.list_articles().await {
        Ok(articles) => articles,
        Err(err) => {
            error!("error fetching news articles: {}", err);
            notices.push(Notice::FetchFailed);
            Vec::new()
        }
    };

    let refresh_after = if notices.contains(&Notice::Generated) {
        let delay = RefreshDelayMillis::get().unwrap_or(2000);
        Some(refresh_after_seconds(Duration::from_millis(delay)))
    } else {
        None
    };

    let term = search.as_deref().unwrap_or_default();
    let word_count = PreviewWordCount::get().unwrap_or(15);
    let articles = filter_articles(&articles, term)
        .into_iter()
        .map(|article| ArticleCard {
            topic: &article.topic,
            title: &article.title,
            slug: slug_segment(&article.slug),
            preview: preview(&article.content, word_count),
        })
        .collect();

    Template::render(
        "list_news",
        ListNewsContext {
            request: RequestData::new(language, Some(term), &notices),
            articles,
            refresh_after,
        },
    )
}

#[derive(Serialize)]
struct ViewNewsContext {
    request: RequestData,
    article: Article,
}

#[derive(Serialize)]
struct NewsNotFoundContext<'a> {
    request: RequestData,
    slug: &'a str,
}

#[get("/news/<slug>")]
pub async fn view_news(
    slug: &str,
    language: UserLanguage,
    source: &State<SharedSource>,
) -> Result<Template, NotFound<Template>> {
    // There is no single article endpoint, and a failed fetch is shown the
    // same way as an unknown slug.
    let article = match source.list_articles().await {
        Ok(articles) => Article::find_by_slug(&articles, slug).cloned(),
        Err(err) => {
            error!("error fetching article {:?}: {}", slug, err);
            None
        }
    };

    let request = RequestData::new(language, None, &[]);
    match article {
        Some(article) => Ok(Template::render(
            "view_news",
            ViewNewsContext { request, article },
        )),
        None => Err(NotFound(Template::render(
            "news_not_found",
            NewsNotFoundContext { request, slug },
        ))),
    }
}

async fn request_generation(source: &SharedSource, topic: &str) -> Notice {
    if topic.trim().is_empty() {
        return Notice::TopicRequired;
    }

    match source.generate(topic).await {
        Ok(()) => {
            info!("requested generation for {:?}", topic);
            Notice::Generated
        }
        Err(err) => {
            error!("error generating news for {:?}: {}", topic, err);
            Notice::GenerateFailed
        }
    }
}

#[derive(Deserialize, Debug)]
pub struct GenerateRequest {
    #[serde(default)]
    topic: String,
}

#[derive(Serialize, Debug)]
pub struct GenerateResponse {
    error: bool,
    title: String,
    message: String,
    refresh_after_millis: Option<u64>,
}

/// Used by the generate form's script, which stays on the page and reloads
/// it once the refresh delay has passed.
#[post("/generate", format = "json", data = "<request>")]
pub async fn generate_news(
    request: Json<GenerateRequest>,
    language: UserLanguage,
    source: &State<SharedSource>,
) -> Json<GenerateResponse> {
    let notice = request_generation(source, &request.topic).await;
    let view = notice.view();

    Json(GenerateResponse {
        error: view.error,
        title: localize(&language.0, view.title),
        message: localize(&language.0, view.message),
        refresh_after_millis: (!notice.is_error())
            .then(|| RefreshDelayMillis::get().unwrap_or(2000)),
    })
}

#[derive(FromForm, Debug)]
pub struct GenerateForm {
    #[field(default = String::new())]
    topic: String,
    #[field(default = String::new())]
    search: String,
}

/// Plain form submission, used when scripts are disabled. The redirect
/// renders the list straight away, then the flash adds the delayed refresh.
#[post("/generate", format = "form", data = "<form>")]
pub async fn generate_news_form(
    form: Form<GenerateForm>,
    source: &State<SharedSource>,
) -> Flash<Redirect> {
    let notice = request_generation(source, &form.topic).await;

    let redirect = Redirect::to(location_for(&form.search));
    if notice.is_error() {
        Flash::error(redirect, notice.key())
    } else {
        Flash::success(redirect, notice.key())
    }
}

#[get("/search?<q>")]
pub fn search_news(q: Option<&str>) -> Redirect {
    Redirect::to(location_for(q.unwrap_or_default()))
}
