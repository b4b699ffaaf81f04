//! Query Classifier
//!
//! Decides whether a query is about:
//! - Finance: market indices, stocks, exchanges
//! - Weather: temperature, forecasts, or a known city
//!
//! Keyword tables give a cheap first answer. Ambiguous queries get a second
//! opinion from web-search snippets; if that fails the answer is `Unknown`.

use crate::error::AcquisitionError;
use crate::models::Classification;
use crate::providers::WebSearchProvider;
use crate::Result;
use std::sync::Arc;
use tracing::{debug, warn};

/// Hits inspected from the web search
const SEARCH_RESULT_LIMIT: usize = 5;

/// Static keyword lists
const FINANCE_KEYWORDS: &[&str] = &[
    // English
    "stock", "stocks", "share", "shares", "index", "indices", "market", "nasdaq",
    "dow", "sp500", "s&p", "ftse", "dax", "nikkei", "equity", "equities",
    "ticker", "trading", "exchange", "tsx", "asx", "hsi", "kospi",
    // Traditional Chinese
    "股票", "股市", "股價", "指數", "加權", "上市", "上櫃", "台股", "美股",
    "港股", "陸股", "日股", "韓股", "盤勢", "大盤", "個股", "證券",
    "交易所", "櫃買", "恆生", "日經", "那斯達克", "道瓊", "標普",
    // Simplified Chinese
    "股票", "股市", "股价", "指数", "上市", "上柜", "台股", "美股",
    "港股", "陆股", "日股", "韩股", "盘势", "大盘", "个股", "证券",
];

const WEATHER_KEYWORDS: &[&str] = &[
    // English
    "weather", "temperature", "temp", "celsius", "fahrenheit", "rainfall",
    "precipitation", "humidity", "wind", "forecast", "climate", "hot", "cold",
    "sunny", "cloudy", "rain", "snow", "storm", "degrees",
    // Traditional Chinese
    "天氣", "氣溫", "溫度", "降雨", "雨量", "濕度", "風速", "預報",
    "氣候", "熱", "冷", "晴", "陰", "雨", "雪", "暴風", "攝氏", "華氏",
    // Simplified Chinese
    "天气", "气温", "温度", "降雨", "雨量", "湿度", "风速", "预报",
    "气候", "热", "冷", "晴", "阴", "雨", "雪", "暴风", "摄氏", "华氏",
];

const LOCATION_KEYWORDS: &[&str] = &[
    // English
    "taipei", "tokyo", "beijing", "shanghai", "hong kong", "seoul",
    "singapore", "bangkok", "hanoi", "manila", "jakarta", "kuala lumpur",
    "new york", "london", "paris", "berlin", "sydney", "toronto",
    // Traditional Chinese
    "台北", "台中", "台南", "高雄", "新北", "桃園", "台灣",
    "東京", "北京", "上海", "香港", "首爾", "新加坡", "曼谷",
    "河內", "馬尼拉", "雅加達", "吉隆坡", "紐約", "倫敦", "巴黎",
    // Simplified Chinese
    "台北", "台中", "台南", "高雄", "新北", "桃园", "台湾",
    "东京", "北京", "上海", "香港", "首尔", "新加坡", "曼谷",
    "河内", "马尼拉", "雅加达", "吉隆坡", "纽约", "伦敦", "巴黎",
];

/// Keyword signals found in one piece of text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Signals {
    finance: bool,
    weather: bool,
    location: bool,
}

impl Signals {
    fn scan(text: &str) -> Self {
        let lowered = text.to_lowercase();
        Self {
            finance: contains_any(&lowered, FINANCE_KEYWORDS),
            weather: contains_any(&lowered, WEATHER_KEYWORDS),
            location: contains_any(&lowered, LOCATION_KEYWORDS),
        }
    }

    /// Decisive only when exactly one domain is signalled.
    fn direct(self) -> Option<Classification> {
        let weather_like = self.weather || self.location;
        match (self.finance, weather_like) {
            (true, false) => Some(Classification::Finance),
            (false, true) => Some(Classification::Weather),
            _ => None,
        }
    }

    /// Snippet text is noisier; finance wins any tie.
    fn from_snippets(self) -> Option<Classification> {
        if self.finance {
            Some(Classification::Finance)
        } else if self.weather || self.location {
            Some(Classification::Weather)
        } else {
            None
        }
    }
}

fn contains_any(lowered: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|kw| lowered.contains(kw))
}

/// Query classifier with an optional web-search second opinion
pub struct QueryClassifier {
    search: Option<Arc<dyn WebSearchProvider>>,
}

impl QueryClassifier {
    pub fn new(search: Option<Arc<dyn WebSearchProvider>>) -> Self {
        Self { search }
    }

    /// Keyword-only classifier
    pub fn offline() -> Self {
        Self { search: None }
    }

    /// Classify a query. Only blank input is an error; search failures
    /// degrade to `Unknown`.
    pub async fn classify(&self, query: &str) -> Result<Classification> {
        if query.trim().is_empty() {
            return Err(AcquisitionError::InvalidInput(
                "Query must be a non-empty string".to_string(),
            ));
        }

        if let Some(classification) = Signals::scan(query).direct() {
            debug!(%classification, "Classified by keywords");
            return Ok(classification);
        }

        match self.classify_with_web_search(query).await {
            Some(classification) => {
                debug!(%classification, "Classified by web search");
                Ok(classification)
            }
            None => Ok(Classification::Unknown),
        }
    }

    async fn classify_with_web_search(&self, query: &str) -> Option<Classification> {
        let search = self.search.as_ref()?;

        let hits = match search.search(query, SEARCH_RESULT_LIMIT).await {
            Ok(hits) => hits,
            Err(e) => {
                warn!(error = %e, "Web search classification failed");
                return None;
            }
        };

        if hits.is_empty() {
            return None;
        }

        let snippets = hits
            .iter()
            .take(SEARCH_RESULT_LIMIT)
            .map(|hit| format!("{} {}", hit.title, hit.snippet))
            .collect::<Vec<_>>()
            .join(" ");

        Signals::scan(&snippets).from_snippets()
    }
}
