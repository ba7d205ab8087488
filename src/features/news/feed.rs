//! Page fetching and parsing for campus news and notices.

use anyhow::{anyhow, Result};
use log::{debug, warn};
use regex::Regex;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;

use super::{is_important, sample_news, sample_notices, NewsItem, Notice, NEWS_SOURCE};

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

const MAX_NEWS_CANDIDATES: usize = 20;
const MAX_NOTICE_CANDIDATES: usize = 15;

/// Tried in order; the first selector with any match is used
const NEWS_SELECTORS: [&str; 4] = ["a.news-title", "a.title", "li.news-item", "div.news"];

pub struct NewsScraper {
    client: reqwest::Client,
    news_url: String,
    notices_url: String,
}

impl NewsScraper {
    pub fn new(news_url: &str, notices_url: &str, timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
            ),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("zh-CN,zh;q=0.9,en;q=0.8"));

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(BROWSER_USER_AGENT)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            news_url: news_url.to_string(),
            notices_url: notices_url.to_string(),
        })
    }

    async fn fetch_page(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                anyhow!("Request timed out")
            } else if e.is_connect() {
                anyhow!("Could not connect to the server")
            } else {
                anyhow!("HTTP request failed: {e}")
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("Server returned HTTP {status}"));
        }

        Ok(response.text().await?)
    }

    /// Latest homepage news, or sample news when the page is unreachable or yields nothing
    pub async fn get_latest_news(&self) -> Vec<NewsItem> {
        let news = match self.fetch_page(&self.news_url).await {
            Ok(html) => parse_news_page(&html, &self.news_url, &today()),
            Err(e) => {
                warn!("Failed to fetch news from {}: {}", self.news_url, e);
                Vec::new()
            }
        };

        if news.is_empty() {
            debug!("Using sample news");
            sample_news()
        } else {
            news
        }
    }

    /// Academic affairs notices, or sample notices on failure
    pub async fn get_important_notices(&self) -> Vec<Notice> {
        let notices = match self.fetch_page(&self.notices_url).await {
            Ok(html) => parse_notices_page(&html, &self.notices_url, &today()),
            Err(e) => {
                warn!("Failed to fetch notices from {}: {}", self.notices_url, e);
                Vec::new()
            }
        };

        if notices.is_empty() {
            debug!("Using sample notices");
            sample_notices()
        } else {
            notices
        }
    }

    pub async fn search_news(&self, keyword: &str) -> Vec<NewsItem> {
        filter_news(self.get_latest_news().await, keyword)
    }
}

pub fn filter_news(news: Vec<NewsItem>, keyword: &str) -> Vec<NewsItem> {
    news.into_iter()
        .filter(|n| n.title.contains(keyword))
        .collect()
}

fn today() -> String {
    chrono::Local::now().format("%Y-%m-%d").to_string()
}

/// Concatenated, whitespace-trimmed text of an element
fn element_text(element: &ElementRef) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("")
}

fn element_href(element: &ElementRef) -> String {
    element.value().attr("href").unwrap_or("").to_string()
}

/// Join a relative link onto `base`; absolute links are returned as-is
fn resolve_url(base: &str, href: &str) -> String {
    if href.starts_with("http") {
        return href.to_string();
    }
    format!("{}/{}", base.trim_end_matches('/'), href.trim_start_matches('/'))
}

fn news_candidates<'a>(document: &'a Html) -> Vec<ElementRef<'a>> {
    for selector in NEWS_SELECTORS {
        if let Ok(selector) = Selector::parse(selector) {
            let items: Vec<_> = document.select(&selector).collect();
            if !items.is_empty() {
                return items;
            }
        }
    }

    // No known layout: any link with text
    match Selector::parse("a[href]") {
        Ok(selector) => document
            .select(&selector)
            .filter(|a| !element_text(a).is_empty())
            .collect(),
        Err(_) => Vec::new(),
    }
}

/// Extract news items from the homepage HTML.
///
/// Only the first twenty candidates are considered. Titles of five characters
/// or fewer and bare URLs are dropped.
pub fn parse_news_page(html: &str, base_url: &str, date: &str) -> Vec<NewsItem> {
    let document = Html::parse_document(html);

    news_candidates(&document)
        .into_iter()
        .take(MAX_NEWS_CANDIDATES)
        .filter_map(|item| {
            let title = element_text(&item);
            if title.chars().count() <= 5 || title.starts_with("http") {
                return None;
            }
            let href = element_href(&item);
            let url = if href.is_empty() {
                href
            } else {
                resolve_url(base_url, &href)
            };
            Some(NewsItem {
                title,
                url,
                date: date.to_string(),
                source: NEWS_SOURCE.to_string(),
            })
        })
        .collect()
}

/// Extract notices from the academic affairs page.
///
/// Candidates are `a`, `li` and `div` elements with a notice/news/list class.
pub fn parse_notices_page(html: &str, base_url: &str, date: &str) -> Vec<Notice> {
    let document = Html::parse_document(html);
    let (Ok(selector), Ok(class_pattern)) = (
        Selector::parse("a, li, div"),
        Regex::new(r"(?i)notice|news|list"),
    ) else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter(|el| el.value().classes().any(|c| class_pattern.is_match(c)))
        .take(MAX_NOTICE_CANDIDATES)
        .filter_map(|item| {
            let title = element_text(&item);
            if title.chars().count() <= 3 {
                return None;
            }
            Some(Notice {
                important: is_important(&title),
                url: resolve_url(base_url, &element_href(&item)),
                title,
                date: date.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "http://www.yulinu.edu.cn/";

    #[test]
    fn test_news_selector_cascade() {
        let html = r#"
            <html><body>
              <a class="title" href="/info/1001.htm">榆林学院召开新学期工作部署会</a>
              <a class="title" href="http://other.example/2.htm">我校学生在全国竞赛中获奖</a>
              <a class="title" href="/x">短标题</a>
              <a href="/ignored">不应出现的普通链接标题</a>
            </body></html>"#;
        let news = parse_news_page(html, BASE, "2024-03-01");
        assert_eq!(news.len(), 2);
        assert_eq!(news[0].url, "http://www.yulinu.edu.cn/info/1001.htm");
        assert_eq!(news[1].url, "http://other.example/2.htm");
        assert!(news.iter().all(|n| n.date == "2024-03-01"));
    }

    #[test]
    fn test_news_falls_back_to_links() {
        let html = r#"
            <ul>
              <li><a href="news/7.htm">  关于举办校园文化节的通知  </a></li>
              <li><a href="http://example.com/long-link-text">http://example.com/long-link-text</a></li>
              <li><a href="/empty"></a></li>
            </ul>"#;
        let news = parse_news_page(html, BASE, "2024-03-01");
        assert_eq!(news.len(), 1);
        assert_eq!(news[0].title, "关于举办校园文化节的通知");
        assert_eq!(news[0].url, "http://www.yulinu.edu.cn/news/7.htm");
    }

    #[test]
    fn test_news_considers_first_twenty_candidates() {
        let links: String = (0..30)
            .map(|i| format!(r#"<a class="news-title" href="/n/{i}">校园新闻标题第{i}条</a>"#))
            .collect();
        assert_eq!(parse_news_page(&links, BASE, "2024-03-01").len(), 20);
    }

    #[test]
    fn test_notices_flag_important() {
        let html = r#"
            <div>
              <a class="notice-item" href="/n/1.htm">关于期末考试安排的通知</a>
              <a class="NewsLink" href="http://jwc.example/n/2.htm">图书馆开放时间调整</a>
              <a class="other" href="/n/3.htm">不匹配的链接考试</a>
              <li class="list">短</li>
            </div>"#;
        let notices = parse_notices_page(html, "http://jwc.yulinu.edu.cn/", "2024-03-01");
        assert_eq!(notices.len(), 2);
        assert!(notices[0].important);
        assert_eq!(notices[0].url, "http://jwc.yulinu.edu.cn/n/1.htm");
        assert!(!notices[1].important);
        assert_eq!(notices[1].url, "http://jwc.example/n/2.htm");
    }

    #[test]
    fn test_filter_news() {
        let results = filter_news(super::super::sample_news(), "图书馆");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "榆林学院图书馆新增电子资源");
    }

    #[tokio::test]
    async fn test_unreachable_site_uses_samples() {
        let scraper = NewsScraper::new(
            "http://127.0.0.1:9/",
            "http://127.0.0.1:9/",
            Duration::from_secs(2),
        )
        .unwrap();
        assert_eq!(scraper.get_latest_news().await, super::super::sample_news());
        assert_eq!(
            scraper.get_important_notices().await,
            super::super::sample_notices()
        );
    }
}
