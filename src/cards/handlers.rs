use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use tera::Context;
use tracing::{error, instrument, warn};

use crate::{
    auth::extractors::SessionUser,
    cards::dto::{CardForm, CardView, ListQuery},
    error::AppError,
    state::AppState,
};

pub fn card_routes() -> Router<AppState> {
    Router::new()
        .route("/cards", get(list_cards))
        .route("/cards/add", get(show_add_card).post(add_card))
        .route("/cards/edit/:id", get(show_edit_card).post(edit_card))
        .route("/cards/delete/:id", post(delete_card))
}

fn page_context(title: &str, session: &SessionUser) -> Context {
    let mut ctx = Context::new();
    ctx.insert("title", title);
    ctx.insert("username", &session.username);
    ctx
}

fn back_to_list() -> Response {
    Redirect::to("/cards").into_response()
}

#[instrument(skip(state, session, query), fields(user_id = session.user_id))]
pub async fn list_cards(
    State(state): State<AppState>,
    session: SessionUser,
    Query(query): Query<ListQuery>,
) -> Response {
    let search = query.search();
    let page = match state
        .cards
        .list_cards(session.user_id, query.page(), query.page_size(), search)
        .await
    {
        Ok(p) => p,
        Err(e) => {
            error!(error = %e, "list cards failed");
            return state.views.error_page(
                StatusCode::INTERNAL_SERVER_ERROR,
                "failed to load cards",
                Some(&session.username),
            );
        }
    };

    let cards: Vec<CardView> = page.items.iter().map(CardView::from).collect();
    let total_pages = page.total_pages();
    let page_numbers = page.page_window();

    let mut ctx = page_context("My Card Collection", &session);
    ctx.insert("cards", &cards);
    ctx.insert("page", &page.page);
    ctx.insert("page_size", &page.page_size);
    ctx.insert("total", &page.total);
    ctx.insert("total_pages", &total_pages);
    ctx.insert("page_numbers", &page_numbers);
    ctx.insert("prev_page", &page.prev_page());
    ctx.insert("next_page", &page.next_page());
    ctx.insert("search", search);
    state.views.page(StatusCode::OK, "cards.html", &ctx)
}

pub async fn show_add_card(State(state): State<AppState>, session: SessionUser) -> Response {
    let mut ctx = page_context("Add Card", &session);
    ctx.insert("card", &CardView::default());
    state.views.page(StatusCode::OK, "add_card.html", &ctx)
}

#[instrument(skip(state, session, form), fields(user_id = session.user_id))]
pub async fn add_card(
    State(state): State<AppState>,
    session: SessionUser,
    Form(form): Form<CardForm>,
) -> Response {
    match state.cards.create_card(session.user_id, form.to_fields()).await {
        Ok(_) => back_to_list(),
        Err(e) => {
            error!(error = %e, "create card failed");
            let mut ctx = page_context("Add Card", &session);
            ctx.insert("card", &CardView::from(&form));
            ctx.insert("error", "failed to add card");
            state.views.page(StatusCode::OK, "add_card.html", &ctx)
        }
    }
}

#[instrument(skip(state, session), fields(user_id = session.user_id))]
pub async fn show_edit_card(
    State(state): State<AppState>,
    session: SessionUser,
    Path(id): Path<String>,
) -> Response {
    let Ok(card_id) = id.parse::<i64>() else {
        return back_to_list();
    };

    match state.cards.get_card(card_id, session.user_id).await {
        Ok(card) => {
            let mut ctx = page_context("Edit Card", &session);
            ctx.insert("card", &CardView::from(&card));
            state.views.page(StatusCode::OK, "edit_card.html", &ctx)
        }
        Err(e) => {
            warn!(error = %e, card_id, "edit form for unavailable card");
            back_to_list()
        }
    }
}

#[instrument(skip(state, session, form), fields(user_id = session.user_id))]
pub async fn edit_card(
    State(state): State<AppState>,
    session: SessionUser,
    Path(id): Path<String>,
    Form(form): Form<CardForm>,
) -> Response {
    let Ok(card_id) = id.parse::<i64>() else {
        return back_to_list();
    };

    if let Err(e) = state
        .cards
        .update_card(card_id, session.user_id, form.to_fields())
        .await
    {
        log_card_failure(&e, card_id, "update card failed");
    }
    back_to_list()
}

#[instrument(skip(state, session), fields(user_id = session.user_id))]
pub async fn delete_card(
    State(state): State<AppState>,
    session: SessionUser,
    Path(id): Path<String>,
) -> Response {
    let Ok(card_id) = id.parse::<i64>() else {
        return back_to_list();
    };

    if let Err(e) = state.cards.delete_card(card_id, session.user_id).await {
        log_card_failure(&e, card_id, "delete card failed");
    }
    back_to_list()
}

fn log_card_failure(e: &AppError, card_id: i64, message: &str) {
    if e.is_user_facing() {
        warn!(error = %e, card_id, "{message}");
    } else {
        error!(error = %e, card_id, "{message}");
    }
}
