use crate::blacklist::Blacklist;
use crate::error::EngineError;
use crate::model::{BlacklistStatus, Track};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterKind {
    Title,
    Author,
    Uploader,
    Duration,
}

impl FilterKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Author => "author",
            Self::Uploader => "uploader",
            Self::Duration => "duration",
        }
    }
}

impl FromStr for FilterKind {
    type Err = EngineError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        match text {
            "title" => Ok(Self::Title),
            "author" => Ok(Self::Author),
            "uploader" => Ok(Self::Uploader),
            "duration" => Ok(Self::Duration),
            other => Err(EngineError::InvalidFilterKind(other.to_string())),
        }
    }
}

/// One comparison per kind, fixed at construction. Keyword text is validated
/// up front so `apply` never has to re-parse anything.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Predicate {
    DurationUnder(u64),
    AuthorContains(String),
    UploaderContains(String),
    TitleContains(String),
}

/// A single predicate over track attributes, optionally negated.
///
/// Wire syntax is `"!"? kind ":" keyword`; keywords are lower-cased at
/// construction and text comparisons are case-insensitive substring checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "FilterRepr", into = "FilterRepr")]
pub struct Filter {
    negative: bool,
    predicate: Predicate,
}

impl Filter {
    pub fn new(negative: bool, kind: FilterKind, keyword: &str) -> Result<Self, EngineError> {
        let keyword = keyword.to_lowercase();
        let predicate = match kind {
            FilterKind::Duration => {
                if keyword.is_empty() || !keyword.bytes().all(|byte| byte.is_ascii_digit()) {
                    return Err(EngineError::InvalidDurationValue);
                }
                let seconds = keyword
                    .parse()
                    .map_err(|_| EngineError::InvalidDurationValue)?;
                Predicate::DurationUnder(seconds)
            }
            FilterKind::Author => Predicate::AuthorContains(keyword),
            FilterKind::Uploader => Predicate::UploaderContains(keyword),
            FilterKind::Title => Predicate::TitleContains(keyword),
        };
        Ok(Self { negative, predicate })
    }

    pub fn parse(text: &str) -> Result<Self, EngineError> {
        let (negative, rest) = match text.strip_prefix('!') {
            Some(rest) => (true, rest),
            None => (false, text),
        };
        let (kind, keyword) = rest.split_once(':').ok_or(EngineError::InvalidFilterSyntax)?;
        if keyword.is_empty() {
            return Err(EngineError::InvalidFilterSyntax);
        }
        let kind: FilterKind = kind.parse().map_err(|err| match err {
            // Unknown kinds in filter text read as malformed input, not as a
            // bad kind on an otherwise valid filter.
            EngineError::InvalidFilterKind(_) => EngineError::InvalidFilterSyntax,
            other => other,
        })?;
        Self::new(negative, kind, keyword)
    }

    pub fn apply(&self, track: &Track) -> bool {
        let hit = match &self.predicate {
            Predicate::DurationUnder(limit) => track.duration < *limit,
            Predicate::AuthorContains(keyword) => track.author.to_lowercase().contains(keyword),
            Predicate::UploaderContains(keyword) => {
                track.uploader.to_lowercase().contains(keyword)
            }
            Predicate::TitleContains(keyword) => track.title.to_lowercase().contains(keyword),
        };
        hit != self.negative
    }

    /// Human-readable sentence describing what the filter selects.
    pub fn explain(&self) -> String {
        match &self.predicate {
            Predicate::DurationUnder(limit) => format!(
                "selects tracks that are {} than {limit} seconds long",
                if self.negative { "more" } else { "less" }
            ),
            _ => format!(
                "selects tracks if {} {}contains {}",
                self.kind().label(),
                if self.negative { "doesn't " } else { "" },
                self.keyword()
            ),
        }
    }

    pub fn negative(&self) -> bool {
        self.negative
    }

    pub fn kind(&self) -> FilterKind {
        match self.predicate {
            Predicate::DurationUnder(_) => FilterKind::Duration,
            Predicate::AuthorContains(_) => FilterKind::Author,
            Predicate::UploaderContains(_) => FilterKind::Uploader,
            Predicate::TitleContains(_) => FilterKind::Title,
        }
    }

    pub fn keyword(&self) -> String {
        match &self.predicate {
            Predicate::DurationUnder(limit) => limit.to_string(),
            Predicate::AuthorContains(keyword)
            | Predicate::UploaderContains(keyword)
            | Predicate::TitleContains(keyword) => keyword.clone(),
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}:{}",
            if self.negative { "!" } else { "" },
            self.kind().label(),
            self.keyword()
        )
    }
}

/// Persisted/wire form of a filter: `{negative, kind, keyword}`. The kind
/// stays a plain string here so stored state with entries this build no
/// longer recognizes can be skipped instead of poisoning the whole load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterRepr {
    pub negative: bool,
    pub kind: String,
    pub keyword: String,
}

impl From<Filter> for FilterRepr {
    fn from(filter: Filter) -> Self {
        Self {
            negative: filter.negative(),
            kind: filter.kind().label().to_string(),
            keyword: filter.keyword(),
        }
    }
}

impl TryFrom<FilterRepr> for Filter {
    type Error = EngineError;

    fn try_from(repr: FilterRepr) -> Result<Self, Self::Error> {
        let kind: FilterKind = repr.kind.parse()?;
        Filter::new(repr.negative, kind, &repr.keyword)
    }
}

/// The active conjunction of filters plus the blacklist gate. Order only
/// matters for display; eligibility is a plain AND.
#[derive(Debug, Default)]
pub struct FilterSet {
    filters: Vec<Filter>,
}

impl FilterSet {
    pub fn add(&mut self, filter: Filter) {
        self.filters.push(filter);
    }

    pub fn remove_at(&mut self, index: usize) -> Result<Filter, EngineError> {
        if index >= self.filters.len() {
            return Err(EngineError::IndexOutOfRange {
                index,
                len: self.filters.len(),
            });
        }
        Ok(self.filters.remove(index))
    }

    pub fn clear(&mut self) {
        self.filters.clear();
    }

    pub fn replace(&mut self, filters: Vec<Filter>) {
        self.filters = filters;
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Filter> {
        self.filters.iter()
    }

    pub fn serialize(&self) -> Vec<FilterRepr> {
        self.filters.iter().cloned().map(FilterRepr::from).collect()
    }

    /// Rebuilds a set from stored form, dropping entries that no longer
    /// convert instead of failing the whole restore.
    pub fn restore(reprs: Vec<FilterRepr>) -> Self {
        let mut set = Self::default();
        for repr in reprs {
            match Filter::try_from(repr) {
                Ok(filter) => set.add(filter),
                Err(err) => warn!(error = %err, "skipping stored filter"),
            }
        }
        set
    }

    /// A track is eligible when every filter matches and, with the blacklist
    /// active, the track is not `FullIgnored`. An `Ignored` entry still
    /// passes the gate.
    pub fn is_eligible(&self, track: &Track, blacklist: &Blacklist, blacklist_active: bool) -> bool {
        let passes = self.filters.iter().all(|filter| filter.apply(track));
        if !blacklist_active {
            return passes;
        }
        passes && !matches!(blacklist.get(&track.id), Some(BlacklistStatus::FullIgnored))
    }
}
