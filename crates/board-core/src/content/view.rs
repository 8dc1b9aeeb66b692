//! Board listing derivation: filter, search, sort, paginate.
//!
//! Pure functions over the loaded collection. Never touches the network.

use std::fmt;
use std::str::FromStr;

use board_types::{Category, Post};

pub const DEFAULT_PER_PAGE: usize = 10;

/// Listing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Highest id first
    #[default]
    Latest,
    /// Most likes first
    Popular,
}

impl SortOrder {
    pub fn id(self) -> &'static str {
        match self {
            SortOrder::Latest => "latest",
            SortOrder::Popular => "popular",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "latest" => Ok(SortOrder::Latest),
            "popular" => Ok(SortOrder::Popular),
            other => Err(format!("unknown sort order '{other}' (expected latest or popular)")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardQuery {
    pub category: Category,
    pub search: String,
    pub sort: SortOrder,
    /// 1-based page number
    pub page: usize,
    pub per_page: usize,
}

impl Default for BoardQuery {
    fn default() -> Self {
        Self {
            category: Category::All,
            search: String::new(),
            sort: SortOrder::Latest,
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

/// One page of the derived listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardPage<'a> {
    pub posts: Vec<&'a Post>,
    pub page: usize,
    pub total_pages: usize,
    /// Posts matching the filter across all pages
    pub total: usize,
}

/// Filters and orders the whole collection. Ties keep their input order.
pub fn arrange<'a>(posts: &'a [Post], query: &BoardQuery) -> Vec<&'a Post> {
    let search = query.search.trim();
    let mut matching: Vec<&Post> = posts
        .iter()
        .filter(|post| query.category.admits(&post.category))
        .filter(|post| post.matches_search(search))
        .collect();

    sort_posts(&mut matching, query.sort);
    matching
}

/// Stable sort by `order`.
pub fn sort_posts(posts: &mut [&Post], order: SortOrder) {
    match order {
        SortOrder::Latest => posts.sort_by(|a, b| b.id.cmp(&a.id)),
        SortOrder::Popular => posts.sort_by(|a, b| b.like_count().cmp(&a.like_count())),
    }
}

/// Derives the requested page. Pages past the end are empty.
pub fn paginate<'a>(posts: &'a [Post], query: &BoardQuery) -> BoardPage<'a> {
    let per_page = if query.per_page == 0 {
        DEFAULT_PER_PAGE
    } else {
        query.per_page
    };
    let page = query.page.max(1);

    let arranged = arrange(posts, query);
    let total = arranged.len();
    let total_pages = total.div_ceil(per_page);
    let posts = arranged
        .into_iter()
        .skip((page - 1).saturating_mul(per_page))
        .take(per_page)
        .collect();

    BoardPage {
        posts,
        page,
        total_pages,
        total,
    }
}
