use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, Response, StatusCode},
    Json,
};

use crate::{
    cards::{CardId, CollectionId},
    error::{GameError, Res},
    game::{BulkOrdering, EntryId, Game, UserId},
    page::{paginate, Page},
    Resp,
};

/// Header carrying the authenticated user's id, set by the identity layer in
/// front of this server.
pub const USER_HEADER: &str = "x-user-id";

type Reply = Response<String>;

const CARDS_PAGE_SIZE: usize = 18;
const COLLECTIONS_PAGE_SIZE: usize = 10;
const MY_CARDS_PAGE_SIZE: usize = 18;

#[derive(serde::Serialize)]
struct Check<T> {
    result: T,
}

fn caller(headers: &HeaderMap) -> Result<UserId, Reply> {
    let Some(value) = headers.get(USER_HEADER) else {
        return Err(Resp::axum("No user provided.", StatusCode::UNAUTHORIZED));
    };
    value
        .to_str()
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| Resp::axum("Invalid user id.", StatusCode::UNAUTHORIZED))
}

fn reply<T: serde::Serialize>(result: Res<T>) -> Reply {
    match result {
        Ok(value) => Resp::json(&value),
        Err(e) => Resp::error(&e),
    }
}

fn check<T: serde::Serialize>(result: Res<T>) -> Reply {
    reply(result.map(|result| Check { result }))
}

macro_rules! caller {
    ($headers:expr) => {
        match caller(&$headers) {
            Ok(user) => user,
            Err(resp) => return resp,
        }
    };
}

pub async fn signup(State(game): State<Arc<Game>>, headers: HeaderMap) -> Reply {
    let user = caller!(headers);
    reply(game.ensure_profile(user).await)
}

pub async fn profile(State(game): State<Arc<Game>>, headers: HeaderMap) -> Reply {
    let user = caller!(headers);
    reply(game.profile(user).await)
}

/// Query string accepted by the list endpoints.
#[derive(serde::Deserialize)]
pub struct ListParams {
    search: Option<String>,
    page: Option<usize>,
    page_size: Option<usize>,
}

impl ListParams {
    fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    fn page<T>(&self, items: Vec<T>, default_size: usize) -> Res<Page<T>> {
        paginate(items, self.page, self.page_size, default_size)
    }
}

pub async fn list_cards(
    State(game): State<Arc<Game>>,
    Query(params): Query<ListParams>,
) -> Reply {
    let cards = game.catalogue().search_cards(params.search());
    reply(params.page(cards, CARDS_PAGE_SIZE))
}

pub async fn get_card(State(game): State<Arc<Game>>, Path(id): Path<CardId>) -> Reply {
    reply(game.catalogue().card(id).ok_or(GameError::CardNotFound(id)))
}

pub async fn list_collections(
    State(game): State<Arc<Game>>,
    Query(params): Query<ListParams>,
) -> Reply {
    let collections = game.catalogue().search_collections(params.search());
    reply(params.page(collections, COLLECTIONS_PAGE_SIZE))
}

pub async fn get_collection(
    State(game): State<Arc<Game>>,
    Path(id): Path<CollectionId>,
) -> Reply {
    reply(
        game.catalogue()
            .collection(id)
            .ok_or(GameError::CollectionNotFound(id)),
    )
}

pub async fn my_cards(
    State(game): State<Arc<Game>>,
    headers: HeaderMap,
    Query(params): Query<ListParams>,
) -> Reply {
    let user = caller!(headers);
    let entries = game.pending_entries(user, params.search()).await;
    reply(entries.and_then(|entries| params.page(entries, MY_CARDS_PAGE_SIZE)))
}

pub async fn my_history(State(game): State<Arc<Game>>, headers: HeaderMap) -> Reply {
    let user = caller!(headers);
    reply(game.history(user).await)
}

#[derive(serde::Deserialize)]
pub struct AcquireParams {
    source: Option<String>,
}

pub async fn add_card(
    State(game): State<Arc<Game>>,
    headers: HeaderMap,
    Query(params): Query<AcquireParams>,
) -> Reply {
    let user = caller!(headers);
    let source = params.source.unwrap_or_default();
    reply(game.acquire(user, &source).await)
}

pub async fn add_card_to_collection(
    State(game): State<Arc<Game>>,
    headers: HeaderMap,
    Path(entry): Path<EntryId>,
) -> Reply {
    let user = caller!(headers);
    reply(game.commit(user, entry).await)
}

pub async fn craft_card(
    State(game): State<Arc<Game>>,
    headers: HeaderMap,
    Path(card): Path<CardId>,
) -> Reply {
    let user = caller!(headers);
    reply(game.craft(user, card).await)
}

pub async fn turn_to_dust(
    State(game): State<Arc<Game>>,
    headers: HeaderMap,
    Path(entry): Path<EntryId>,
) -> Reply {
    let user = caller!(headers);
    reply(game.disenchant(user, entry).await)
}

#[derive(serde::Deserialize)]
pub struct BulkRequest {
    #[serde(default)]
    cards: Vec<CardId>,
    ordering: Option<String>,
}

pub async fn cards_bulk(
    State(game): State<Arc<Game>>,
    headers: HeaderMap,
    Json(request): Json<BulkRequest>,
) -> Reply {
    let user = caller!(headers);
    let ordering = match request.ordering.as_deref().map(str::parse::<BulkOrdering>) {
        None => None,
        Some(Ok(ordering)) => Some(ordering),
        Some(Err(e)) => return Resp::axum(e, StatusCode::BAD_REQUEST),
    };
    reply(game.cards_bulk(user, &request.cards, ordering).await)
}

pub async fn collection_progress(
    State(game): State<Arc<Game>>,
    headers: HeaderMap,
    Path(collection): Path<CollectionId>,
) -> Reply {
    let user = caller!(headers);
    reply(game.collection_progress(user, collection).await)
}

pub async fn user_statistics(State(game): State<Arc<Game>>, headers: HeaderMap) -> Reply {
    let user = caller!(headers);
    reply(game.user_statistics(user).await)
}

pub async fn is_addable(
    State(game): State<Arc<Game>>,
    headers: HeaderMap,
    Path(entry): Path<EntryId>,
) -> Reply {
    let user = caller!(headers);
    check(game.is_addable(user, entry).await)
}

pub async fn is_daily_card_available(State(game): State<Arc<Game>>, headers: HeaderMap) -> Reply {
    let user = caller!(headers);
    check(game.is_daily_available(user).await)
}

pub async fn is_craftable(
    State(game): State<Arc<Game>>,
    headers: HeaderMap,
    Path(card): Path<CardId>,
) -> Reply {
    let user = caller!(headers);
    check(game.is_craftable(user, card).await)
}
