use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use nh_core::config::Settings;
use nh_core::{retry_with_backoff, Article, Category, Error, Region, Result};
use tokio::task::JoinHandle;
use tokio::time::sleep;

use crate::arena::ArticleArena;
use crate::rate_limit::{remaining_wait, RateLimitTimer, MIN_RATE_LIMIT_WAIT, RATE_LIMIT_WINDOW};
use crate::scraper::ContentScraper;
use crate::source::{NewsSource, PageOutcome, PageRequest};

/// Per-region pagination target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionTarget {
    pub region: Region,
    pub country: Option<String>,
    pub limit: usize,
}

impl RegionTarget {
    pub fn for_region(region: Region) -> Self {
        match region {
            Region::Global => Self {
                region,
                country: None,
                limit: 80,
            },
            Region::India => Self {
                region,
                country: Some("in".to_string()),
                limit: 50,
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub per_request_sleep: Duration,
    pub scrape_delay: Duration,
    pub rate_limit_window: Duration,
    pub min_rate_limit_wait: Duration,
    pub max_rate_limit_retries: u32,
    pub page_retries: u32,
    pub retry_base_delay: Duration,
    pub loop_guard: usize,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            per_request_sleep: Duration::from_secs(1),
            scrape_delay: Duration::from_millis(800),
            rate_limit_window: RATE_LIMIT_WINDOW,
            min_rate_limit_wait: MIN_RATE_LIMIT_WAIT,
            max_rate_limit_retries: 8,
            page_retries: 2,
            retry_base_delay: Duration::from_secs(1),
            loop_guard: 100,
        }
    }
}

impl FetchOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            per_request_sleep: settings.per_request_sleep,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchState {
    Fetching,
    RateLimited,
    BackgroundScraping,
    Waiting,
    Done,
}

impl fmt::Display for FetchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FetchState::Fetching => "fetching",
            FetchState::RateLimited => "rate-limited",
            FetchState::BackgroundScraping => "background-scraping",
            FetchState::Waiting => "waiting",
            FetchState::Done => "done",
        };
        f.write_str(s)
    }
}

/// Mutable state of one `fetch` run.
struct Run {
    arena: Arc<ArticleArena>,
    timer: RateLimitTimer,
    background: Vec<JoinHandle<usize>>,
}

pub struct Fetcher {
    source: Arc<dyn NewsSource>,
    scraper: Arc<dyn ContentScraper>,
    options: FetchOptions,
}

impl Fetcher {
    pub fn new(source: Arc<dyn NewsSource>, scraper: Arc<dyn ContentScraper>, options: FetchOptions) -> Self {
        Self {
            source,
            scraper,
            options,
        }
    }

    pub fn options(&self) -> &FetchOptions {
        &self.options
    }

    /// Fetches every (category, region) bucket in order, deduplicating by id,
    /// then fills in article content. A failing bucket never ends the run.
    pub async fn fetch(&self, categories: &[Category], regions: &[Region]) -> Vec<Article> {
        let mut run = Run {
            arena: Arc::new(ArticleArena::new()),
            timer: RateLimitTimer::default(),
            background: Vec::new(),
        };

        for category in categories {
            for region in regions {
                let target = RegionTarget::for_region(*region);
                tracing::info!("📰 Fetching {} | {} up to {}", category, region, target.limit);
                let fetched = self.fetch_bucket(*category, &target, &mut run).await;
                tracing::info!("✅ Completed {} | {}: {} articles", category, region, fetched);
            }
        }

        for handle in run.background.drain(..) {
            if let Err(e) = handle.await {
                tracing::warn!("⚠️ Background scraping pass failed: {}", e);
            }
        }

        let filled = scrape_pass(run.arena.clone(), self.scraper.clone(), self.options.scrape_delay, "final").await;
        let articles = run.arena.snapshot();
        let with_content = articles.iter().filter(|a| a.has_content()).count();
        tracing::info!(
            state = %FetchState::Done,
            total = articles.len(),
            with_content,
            final_pass = filled,
            "🎉 Fetch finished"
        );
        articles
    }

    async fn fetch_bucket(&self, category: Category, target: &RegionTarget, run: &mut Run) -> usize {
        let mut page: Option<String> = None;
        let mut fetched = 0;
        let mut pages = 0;

        while fetched < target.limit && pages < self.options.loop_guard {
            pages += 1;
            let request = PageRequest {
                category,
                country: target.country.clone(),
                page: page.clone(),
            };

            let (articles, next_page) = match self.fetch_page_with_wait(&request, target.region, run).await {
                Ok(result) => result,
                Err(e) => {
                    tracing::warn!("⚠️ Giving up on {} | {}: {}", category, target.region, e);
                    break;
                }
            };
            if articles.is_empty() {
                break;
            }

            for article in articles {
                if run.arena.insert(article) {
                    fetched += 1;
                    if fetched >= target.limit {
                        break;
                    }
                }
            }
            tracing::info!("✅ {} | {}: {}/{} articles", category, target.region, fetched, target.limit);

            page = next_page;
            if fetched >= target.limit || page.is_none() {
                break;
            }
            sleep(self.options.per_request_sleep).await;
        }
        fetched
    }

    /// One page, waiting out rate limits and retrying the identical request.
    async fn fetch_page_with_wait(
        &self,
        request: &PageRequest,
        region: Region,
        run: &mut Run,
    ) -> Result<(Vec<Article>, Option<String>)> {
        let mut rate_limited = 0u32;
        loop {
            tracing::debug!(state = %FetchState::Fetching, page = ?request.page, "{} | {}", request.category, region);
            let outcome = retry_with_backoff(self.options.page_retries, self.options.retry_base_delay, || {
                self.source.fetch_page(request)
            })
            .await?;

            match outcome {
                PageOutcome::Page { articles, next_page } => return Ok((articles, next_page)),
                PageOutcome::RateLimited { message } => {
                    rate_limited += 1;
                    if rate_limited > self.options.max_rate_limit_retries {
                        return Err(Error::RateLimited(format!(
                            "still limited after {} waits: {}",
                            self.options.max_rate_limit_retries, message
                        )));
                    }
                    tracing::warn!(
                        state = %FetchState::RateLimited,
                        "⚠️ Rate limit detected for {} {}: {}",
                        request.category,
                        region,
                        message
                    );
                    self.wait_out_rate_limit(run).await;
                    tracing::info!("🔄 Retrying {} {}...", request.category, region);
                }
            }
        }
    }

    async fn wait_out_rate_limit(&self, run: &mut Run) {
        run.timer.start_if_idle();

        run.background.retain(|h| !h.is_finished());
        let pending = run.arena.missing_content();
        if pending > 0 {
            tracing::info!(
                state = %FetchState::BackgroundScraping,
                "🔍 Scraping content for {} articles during rate limit wait...",
                pending
            );
            run.background.push(tokio::spawn(scrape_pass(
                run.arena.clone(),
                self.scraper.clone(),
                self.options.scrape_delay,
                "background",
            )));
        }

        let wait = remaining_wait(
            self.options.rate_limit_window,
            run.timer.elapsed(),
            self.options.min_rate_limit_wait,
        );
        tracing::info!(
            state = %FetchState::Waiting,
            "⏳ Waiting {:.1} more mins...",
            wait.as_secs_f64() / 60.0
        );
        sleep(wait).await;
        run.timer.reset();
    }
}

/// Scrapes every article it can claim. Returns how many got content.
async fn scrape_pass(
    arena: Arc<ArticleArena>,
    scraper: Arc<dyn ContentScraper>,
    delay: Duration,
    label: &'static str,
) -> usize {
    let claims = arena.claim_pending();
    if claims.is_empty() {
        return 0;
    }

    let total = claims.len();
    let started = tokio::time::Instant::now();
    tracing::info!("🔍 {} scraping pass over {} articles", label, total);

    let mut filled = 0;
    for (i, claim) in claims.into_iter().enumerate() {
        if i > 0 {
            sleep(delay).await;
        }
        let link = claim.link();
        match scraper.scrape(&link).await {
            Ok(content) => {
                if content.is_some() {
                    filled += 1;
                }
                claim.fill(content);
            }
            Err(e) => tracing::debug!("📄 Failed scraping {}: {}", link, e),
        }
        if (i + 1) % 50 == 0 {
            tracing::info!(
                "🔍 Scraped {}/{} articles in {:.1}s",
                i + 1,
                total,
                started.elapsed().as_secs_f64()
            );
        }
    }

    tracing::info!(
        "✅ {} scraping pass filled {}/{} in {:.1}s",
        label,
        filled,
        total,
        started.elapsed().as_secs_f64()
    );
    filled
}
