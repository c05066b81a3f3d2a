//! Language negotiation middleware.
//!
//! Resolves the display language for each request using a chain of
//! negotiators. Resolution order: `?lang=` query parameter → Accept-Language →
//! catalogue default. Every negotiator answers with a canonical catalogue
//! code or nothing.

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};

use crate::content::LanguageCatalogue;
use crate::state::AppState;

/// The resolved language for the current request.
///
/// Stored in request extensions for per-request access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLanguage(pub String);

/// Trait for language negotiation strategies.
///
/// Implementations inspect the request and return a catalogue language code
/// if they can determine the desired language. The middleware chains
/// negotiators by priority (highest first) and uses the first match.
pub trait LanguageNegotiator: Send + Sync {
    /// Attempt to negotiate a language from the request.
    fn negotiate(&self, request: &Request<Body>) -> Option<String>;

    /// Priority of this negotiator (higher = checked first).
    fn priority(&self) -> i32;
}

/// Negotiates language from the `lang` query parameter (`/api/casino?lang=de`).
pub struct QueryParamNegotiator {
    catalogue: LanguageCatalogue,
}

impl QueryParamNegotiator {
    pub fn new(catalogue: LanguageCatalogue) -> Self {
        Self { catalogue }
    }
}

impl LanguageNegotiator for QueryParamNegotiator {
    fn negotiate(&self, request: &Request<Body>) -> Option<String> {
        let query = request.uri().query()?;
        let (_, requested) = url::form_urlencoded::parse(query.as_bytes()).find(|(k, _)| k == "lang")?;

        let resolved = self.catalogue.resolve(&requested);
        if resolved.is_none() {
            tracing::debug!(requested = %requested, "ignoring unknown lang parameter");
        }
        resolved.map(str::to_string)
    }

    fn priority(&self) -> i32 {
        100
    }
}

/// Negotiates language from the Accept-Language HTTP header.
///
/// Parses quality values and returns the highest-quality language that
/// matches the catalogue. A bare primary subtag (`pt`) matches the first
/// catalogue language with that primary subtag (`pt-BR`).
pub struct AcceptLanguageNegotiator {
    catalogue: LanguageCatalogue,
}

impl AcceptLanguageNegotiator {
    pub fn new(catalogue: LanguageCatalogue) -> Self {
        Self { catalogue }
    }

    /// Parse Accept-Language header value into (language, quality) pairs,
    /// sorted by quality descending (stable sort preserves original order for ties).
    fn parse_accept_language(header: &str) -> Vec<(String, f32)> {
        let mut langs: Vec<(String, f32)> = header
            .split(',')
            .filter_map(|part| {
                let part = part.trim();
                if part.is_empty() {
                    return None;
                }

                let mut segments = part.split(';');
                let lang = segments.next()?.trim().to_lowercase();

                let quality = segments
                    .find_map(|s| {
                        let s = s.trim();
                        s.strip_prefix("q=")
                            .and_then(|q| q.trim().parse::<f32>().ok())
                    })
                    .unwrap_or(1.0)
                    .clamp(0.0, 1.0); // RFC 7231 §5.3.1

                Some((lang, quality))
            })
            .filter(|(lang, quality)| *quality > 0.0 && lang != "*")
            .collect();

        langs.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        langs
    }

    fn match_catalogue(&self, lang: &str) -> Option<&str> {
        if let Some(code) = self.catalogue.resolve(lang) {
            return Some(code);
        }

        let primary = lang.split('-').next()?;
        self.catalogue.resolve(primary).or_else(|| {
            self.catalogue.iter().find(|code| {
                code.split('-')
                    .next()
                    .is_some_and(|p| p.eq_ignore_ascii_case(primary))
            })
        })
    }
}

impl LanguageNegotiator for AcceptLanguageNegotiator {
    fn negotiate(&self, request: &Request<Body>) -> Option<String> {
        let header = request.headers().get("accept-language")?.to_str().ok()?;

        Self::parse_accept_language(header)
            .iter()
            .find_map(|(lang, _quality)| self.match_catalogue(lang))
            .map(str::to_string)
    }

    fn priority(&self) -> i32 {
        50
    }
}

/// Middleware to resolve the display language for each request.
pub async fn resolve_language(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let language = select_language(
        state.language_negotiators(),
        &request,
        state.catalogue().default_language(),
    );

    request.extensions_mut().insert(ResolvedLanguage(language));

    next.run(request).await
}

/// Select the display language (sync, testable).
fn select_language(
    negotiators: &[std::sync::Arc<dyn LanguageNegotiator>],
    request: &Request<Body>,
    default_language: &str,
) -> String {
    negotiators
        .iter()
        .find_map(|negotiator| negotiator.negotiate(request))
        .unwrap_or_else(|| default_language.to_string())
}
