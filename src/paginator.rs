use actix_utils::future::{ok, Ready};
use actix_web::dev::Payload;
use actix_web::{Error, FromRequest, HttpRequest};
use sea_orm::{ConnectionTrait, DbErr, PaginatorTrait, Selector, SelectorTrait};

/// Every post listing is cut into pages of this size.
pub const POSTS_PER_PAGE: usize = 10;

/// Pages shown either side of the current page in the link bar.
const PAGINATOR_LOOK_AHEAD: usize = 2;

/// `?page=` query string shared by every paginated view.
/// Never fails to extract; a repeated parameter resolves to its last value.
#[derive(Debug, Default)]
pub struct PageQuery {
    pub page: Option<String>,
}

impl PageQuery {
    pub fn from_query_string(query: &str) -> Self {
        Self {
            page: url::form_urlencoded::parse(query.as_bytes())
                .filter(|(key, _)| key == "page")
                .map(|(_, value)| value.into_owned())
                .last(),
        }
    }

    pub fn raw(&self) -> Option<&str> {
        self.page.as_deref()
    }
}

impl FromRequest for PageQuery {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ok(Self::from_query_string(req.query_string()))
    }
}

/// One 1-indexed slice of an ordered result set.
#[derive(Debug)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-indexed, always within `1..=num_pages`.
    pub number: usize,
    /// Never zero; an empty result set has one empty page.
    pub num_pages: usize,
    /// Total item count across all pages.
    pub count: usize,
}

/// Entry in the rendered page link bar.
#[derive(Debug, PartialEq, Eq)]
pub struct PageLink {
    pub number: usize,
    pub current: bool,
    /// Elided pages between this link and the previous one.
    pub gap_before: bool,
}

/// Number of pages needed for `count` items.
pub fn page_count(count: usize, per_page: usize) -> usize {
    if count == 0 || per_page == 0 {
        1
    } else {
        (count + per_page - 1) / per_page
    }
}

/// Turns the raw `page` parameter into a valid page number.
///
/// Missing or non-integer input gives the first page. Numbers out of range, including zero
/// and negatives, give the last page.
pub fn resolve_page_number(raw: Option<&str>, num_pages: usize) -> usize {
    let number = match raw.and_then(parse_page_number) {
        Some(number) => number,
        None => return 1,
    };

    if number < 1 || number > num_pages as i64 {
        num_pages
    } else {
        number as usize
    }
}

fn parse_page_number(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if let Ok(number) = raw.parse::<i64>() {
        return Some(number);
    }
    // All digits but too large for i64 is still past the last page.
    let digits = raw.strip_prefix('-').unwrap_or(raw);
    if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
        Some(if raw.starts_with('-') { i64::MIN } else { i64::MAX })
    } else {
        None
    }
}

impl<T> Page<T> {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn has_other_pages(&self) -> bool {
        self.num_pages > 1
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn has_next(&self) -> bool {
        self.number < self.num_pages
    }

    pub fn previous_page_number(&self) -> usize {
        self.number.saturating_sub(1).max(1)
    }

    pub fn next_page_number(&self) -> usize {
        (self.number + 1).min(self.num_pages)
    }

    /// 1 ... 4 5 [6] 7 8 ... 13
    pub fn page_links(&self) -> Vec<PageLink> {
        let low = self.number.saturating_sub(PAGINATOR_LOOK_AHEAD).max(1);
        let high = (self.number + PAGINATOR_LOOK_AHEAD).min(self.num_pages);

        let mut numbers = Vec::with_capacity(high - low + 3);
        if low > 1 {
            numbers.push(1);
        }
        numbers.extend(low..=high);
        if high < self.num_pages {
            numbers.push(self.num_pages);
        }

        let mut previous = 0;
        numbers
            .into_iter()
            .map(|number| {
                let link = PageLink {
                    number,
                    current: number == self.number,
                    gap_before: previous != 0 && number > previous + 1,
                };
                previous = number;
                link
            })
            .collect()
    }
}

/// Counts the selector's rows and loads the requested page of it.
pub async fn fetch_page<'db, C, S>(
    db: &'db C,
    selector: Selector<S>,
    per_page: usize,
    raw: Option<&str>,
) -> Result<Page<S::Item>, DbErr>
where
    C: ConnectionTrait,
    S: SelectorTrait + Send + Sync + 'db,
{
    let paginator = selector.paginate(db, per_page);
    let count = paginator.num_items().await?;
    let num_pages = page_count(count, per_page);
    let number = resolve_page_number(raw, num_pages);
    let items = paginator.fetch_page(number - 1).await?;

    Ok(Page {
        items,
        number,
        num_pages,
        count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifteen_items_make_two_pages() {
        let num_pages = page_count(15, POSTS_PER_PAGE);
        assert_eq!(num_pages, 2);
        assert_eq!(resolve_page_number(None, num_pages), 1);
        assert_eq!(resolve_page_number(Some("2"), num_pages), 2);

        let second = Page {
            items: vec![10, 11, 12, 13, 14],
            number: 2,
            num_pages,
            count: 15,
        };
        assert_eq!(second.len(), 5);
        assert!(second.has_previous());
        assert!(!second.has_next());
        assert_eq!(second.previous_page_number(), 1);
    }

    #[test]
    fn test_page_query_takes_last_value() {
        assert_eq!(PageQuery::from_query_string("").raw(), None);
        assert_eq!(PageQuery::from_query_string("page=3").raw(), Some("3"));
        assert_eq!(PageQuery::from_query_string("page=1&page=2").raw(), Some("2"));
        assert_eq!(PageQuery::from_query_string("q=x&page=%32").raw(), Some("2"));
        assert_eq!(PageQuery::from_query_string("page=%FF").raw(), Some("\u{FFFD}"));
    }

    #[test]
    fn test_bad_page_numbers_fall_back() {
        assert_eq!(resolve_page_number(None, 3), 1);
        assert_eq!(resolve_page_number(Some("abc"), 3), 1);
        assert_eq!(resolve_page_number(Some(""), 3), 1);
        assert_eq!(resolve_page_number(Some("2.5"), 3), 1);
        assert_eq!(resolve_page_number(Some("2.0"), 3), 1);
        assert_eq!(resolve_page_number(Some("-"), 3), 1);
        assert_eq!(resolve_page_number(Some(" 3 "), 3), 3);
        assert_eq!(resolve_page_number(Some("4"), 3), 3);
        assert_eq!(resolve_page_number(Some("0"), 3), 3);
        assert_eq!(resolve_page_number(Some("-1"), 3), 3);
        assert_eq!(resolve_page_number(Some("99999999999999999999"), 3), 3);
    }

    #[test]
    fn test_empty_collection_has_one_page() {
        let num_pages = page_count(0, POSTS_PER_PAGE);
        assert_eq!(num_pages, 1);
        assert_eq!(resolve_page_number(Some("7"), num_pages), 1);

        let page = Page {
            items: Vec::<i32>::new(),
            number: 1,
            num_pages,
            count: 0,
        };
        assert!(page.is_empty());
        assert!(!page.has_other_pages());
    }

    #[test]
    fn test_page_count() {
        assert_eq!(page_count(0, 10), 1);
        assert_eq!(page_count(10, 10), 1);
        assert_eq!(page_count(11, 10), 2);
        assert_eq!(page_count(15, 10), 2);
    }

    #[test]
    fn test_page_links_elide_distant_pages() {
        let page = Page {
            items: Vec::<i32>::new(),
            number: 6,
            num_pages: 13,
            count: 130,
        };
        let numbers: Vec<usize> = page.page_links().iter().map(|l| l.number).collect();
        assert_eq!(numbers, vec![1, 4, 5, 6, 7, 8, 13]);

        let links = page.page_links();
        assert!(links[1].gap_before);
        assert!(!links[2].gap_before);
        assert!(links[3].current);
        assert!(links[6].gap_before);
    }

    #[test]
    fn test_page_links_near_start() {
        let page = Page {
            items: Vec::<i32>::new(),
            number: 2,
            num_pages: 4,
            count: 40,
        };
        let numbers: Vec<usize> = page.page_links().iter().map(|l| l.number).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4]);
        assert!(page.page_links().iter().all(|l| !l.gap_before));
    }
}
