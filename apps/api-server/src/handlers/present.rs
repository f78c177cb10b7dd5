//! Domain values to response DTOs.

use yatube_core::Page;
use yatube_core::domain::{Author, Group, PostEntry};
use yatube_shared::dto::{AuthorResponse, GroupResponse, PageMeta, PageResponse, PostResponse};

/// Characters of a post's text used as its title.
const TITLE_LEN: usize = 30;

pub fn author(author: Author) -> AuthorResponse {
    AuthorResponse {
        id: author.id,
        username: author.username,
    }
}

pub fn group(group: Group) -> GroupResponse {
    GroupResponse {
        id: group.id,
        title: group.title,
        slug: group.slug,
        description: group.description,
    }
}

pub fn entry(entry: PostEntry) -> PostResponse {
    PostResponse {
        id: entry.post.id,
        text: entry.post.text,
        pub_date: entry.post.pub_date,
        author: author(entry.author),
        group: entry.group.map(group),
    }
}

pub fn page(page: Page<PostEntry>) -> PageResponse<PostResponse> {
    let meta = PageMeta {
        number: page.number,
        num_pages: page.num_pages,
        count: page.count,
        per_page: page.per_page,
        has_next: page.has_next(),
        has_previous: page.has_previous(),
        next_page_number: page.next_page_number(),
        previous_page_number: page.previous_page_number(),
        start_index: page.start_index(),
        end_index: page.end_index(),
    };

    PageResponse {
        items: page.items.into_iter().map(entry).collect(),
        meta,
    }
}

pub fn title(text: &str) -> String {
    text.chars().take(TITLE_LEN).collect()
}
