//! The studio's web front end: one route per user action.

use std::io::ErrorKind;
use std::num::NonZeroU16;
use std::sync::Arc;

use axum::Router;
use base64::Engine;
use base64::engine::general_purpose;
use tower_sessions::{Expiry, SessionManagerLayer};

use crate::constants::{DEFAULT_FIXED_SEED, SESSION_EXPIRY_MINUTES, SESSION_PURGE_INTERVAL_SECS};
use crate::request::{GenerationRequest, SeedChoice};
use crate::studio::{Action, Outcome, Studio, is_variation_filename};

mod csrf;
mod flash;
mod prelude;
mod session;
mod store;
mod views;

use csrf::{csrf_token, validate_csrf};
use prelude::*;
use session::{
    FormState, load_form, load_history, owns_variation, remember_variation, save_form,
    save_history,
};
use store::ExpiringMemoryStore;
use views::{ResultView, ShareTemplate, StudioTemplate, UpscaleTemplate, VariationsTemplate};

#[derive(Clone, Debug)]
pub(crate) struct AppState {
    studio: Arc<Studio>,
}

impl AppState {
    fn new(studio: Studio) -> Self {
        Self {
            studio: Arc::new(studio),
        }
    }
}

#[derive(Deserialize)]
pub(crate) struct GenerateForm {
    csrf_token: String,
    prompt: String,
    use_weights: Option<String>,
    use_enhancement: Option<String>,
    style: String,
    #[serde(default)]
    negative_prompt: String,
    steps: u8,
    seed_mode: String,
    #[serde(default)]
    fixed_seed: String,
    aspect_ratio: String,
}

impl GenerateForm {
    fn to_state(&self) -> Result<FormState, StudioError> {
        let fixed_seed_mode = self.seed_mode.trim().eq_ignore_ascii_case("fixed");
        let fixed_seed = match self.fixed_seed.trim() {
            "" => DEFAULT_FIXED_SEED,
            value => match value.parse::<u32>() {
                Ok(seed) => seed,
                Err(_) if !fixed_seed_mode => DEFAULT_FIXED_SEED,
                Err(err) => {
                    return Err(StudioError::InvalidInput(format!(
                        "seed {value:?} is not a number: {err}"
                    )));
                }
            },
        };
        Ok(FormState {
            prompt: self.prompt.clone(),
            use_weights: self.use_weights.is_some(),
            use_enhancement: self.use_enhancement.is_some(),
            style: self.style.parse()?,
            negative_prompt: self.negative_prompt.clone(),
            steps: self.steps,
            fixed_seed_mode,
            fixed_seed,
            aspect_ratio: self.aspect_ratio.parse()?,
        })
    }
}

fn request_from_form(form: &FormState) -> Result<GenerationRequest, StudioError> {
    let seed = if form.fixed_seed_mode {
        SeedChoice::Fixed(form.fixed_seed)
    } else {
        SeedChoice::Random
    };
    GenerationRequest::new(
        form.prompt.clone(),
        form.style,
        form.use_weights,
        form.use_enhancement,
        Some(form.negative_prompt.clone()),
        form.steps,
        seed,
        form.aspect_ratio,
    )
}

#[derive(Deserialize)]
pub(crate) struct CsrfForm {
    csrf_token: String,
}

#[derive(Deserialize)]
pub(crate) struct ShareQuery {
    entry: Option<usize>,
}

fn unexpected_outcome(action: &str) -> StudioError {
    StudioError::InternalServerError(format!("{action} produced an unexpected outcome"))
}

/// handles the / GET
async fn index_handler(session: Session) -> Result<StudioTemplate, StudioError> {
    let history = load_history(&session).await?;
    let form = load_form(&session).await?;
    let csrf_token = csrf_token(&session).await?;
    let flash = flash::take_flash_message(&session).await?;
    Ok(StudioTemplate::new(csrf_token, form, &history, flash))
}

async fn generate_handler(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<GenerateForm>,
) -> Result<Response, StudioError> {
    validate_csrf(&session, &form.csrf_token).await?;
    let form_state = form.to_state()?;
    save_form(&session, &form_state).await?;

    let request = match request_from_form(&form_state) {
        Ok(request) => request,
        Err(StudioError::EmptyPrompt) => {
            flash::set_flash(&session, flash::FLASH_EMPTY_PROMPT).await?;
            return Ok(Redirect::to("/").into_response());
        }
        Err(err) => return Err(err),
    };

    let mut history = load_history(&session).await?;
    let csrf_token = csrf_token(&session).await?;
    match state
        .studio
        .dispatch(&mut history, Action::Generate(request))
        .await
    {
        Ok(Outcome::Generated(outcome)) => {
            save_history(&session, &history).await?;
            let mut page = StudioTemplate::new(csrf_token, form_state, &history, None);
            page.result = Some(ResultView::from(&outcome));
            Ok(page.into_response())
        }
        Ok(_) => Err(unexpected_outcome("generate")),
        Err(err) => {
            error!("Generate failed: {}", err);
            let status = err.status_code();
            let mut page = StudioTemplate::new(csrf_token, form_state, &history, None);
            page.error_message = Some(err.to_string());
            Ok((status, page).into_response())
        }
    }
}

async fn image_handler(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<usize>,
) -> Result<Response, StudioError> {
    let mut history = load_history(&session).await?;
    let Outcome::Download(download) = state
        .studio
        .dispatch(&mut history, Action::Download(id))
        .await?
    else {
        return Err(unexpected_outcome("download"));
    };
    Response::builder()
        .header(CONTENT_TYPE, download.mime)
        .header(
            CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", download.filename),
        )
        .body(axum::body::Body::from(download.bytes))
        .map_err(StudioError::from)
}

async fn upscale_handler(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<usize>,
    Form(form): Form<CsrfForm>,
) -> Result<UpscaleTemplate, StudioError> {
    validate_csrf(&session, &form.csrf_token).await?;
    let mut history = load_history(&session).await?;
    let Outcome::Upscaled(upscaled) = state
        .studio
        .dispatch(&mut history, Action::Upscale(id))
        .await?
    else {
        return Err(unexpected_outcome("upscale"));
    };
    Ok(UpscaleTemplate {
        image_data_uri: format!(
            "data:image/png;base64,{}",
            general_purpose::STANDARD.encode(upscaled)
        ),
    })
}

async fn variations_handler(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<usize>,
    Form(form): Form<CsrfForm>,
) -> Result<VariationsTemplate, StudioError> {
    validate_csrf(&session, &form.csrf_token).await?;
    let mut history = load_history(&session).await?;
    info!("Building variation loop for entry {}", id);
    let Outcome::Variations(outcome) = state
        .studio
        .dispatch(&mut history, Action::BuildVariations(id))
        .await?
    else {
        return Err(unexpected_outcome("build variations"));
    };
    remember_variation(&session, &outcome.filename).await?;
    Ok(VariationsTemplate {
        prompt: outcome.prompt,
        filename: outcome.filename,
    })
}

async fn variation_file_handler(
    State(state): State<AppState>,
    session: Session,
    Path(filename): Path<String>,
) -> Result<Response, StudioError> {
    if !is_variation_filename(&filename) || !owns_variation(&session, &filename).await? {
        return Err(StudioError::NotFound(filename));
    }
    let path = state.studio.settings().variation_dir.join(&filename);
    match tokio::fs::read(&path).await {
        Ok(bytes) => Response::builder()
            .header(CONTENT_TYPE, "image/gif")
            .body(axum::body::Body::from(bytes))
            .map_err(StudioError::from),
        Err(err) if err.kind() == ErrorKind::NotFound => Err(StudioError::NotFound(filename)),
        Err(err) => Err(StudioError::from(err)),
    }
}

async fn regenerate_handler(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<usize>,
    Form(form): Form<CsrfForm>,
) -> Result<Redirect, StudioError> {
    validate_csrf(&session, &form.csrf_token).await?;
    let mut history = load_history(&session).await?;
    let Outcome::Regenerate(prompt) = state
        .studio
        .dispatch(&mut history, Action::Regenerate(id))
        .await?
    else {
        return Err(unexpected_outcome("regenerate"));
    };
    let mut form_state = load_form(&session).await?;
    form_state.prompt = prompt;
    save_form(&session, &form_state).await?;
    flash::set_flash(&session, flash::FLASH_PROMPT_LOADED).await?;
    Ok(Redirect::to("/"))
}

async fn share_handler(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<ShareQuery>,
) -> Result<Response, StudioError> {
    let Some(id) = query.entry else {
        return Ok(Redirect::to("/").into_response());
    };
    let mut history = load_history(&session).await?;
    let Outcome::Share(prompt) = state
        .studio
        .dispatch(&mut history, Action::Share(id))
        .await?
    else {
        return Err(unexpected_outcome("share"));
    };
    Ok(ShareTemplate { prompt }.into_response())
}

async fn styles_handler() -> impl IntoResponse {
    const STYLES: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/static/styles.css"));
    ([(CONTENT_TYPE, "text/css")], STYLES)
}

fn create_router() -> Router<AppState> {
    Router::new()
        .route("/", axum::routing::get(index_handler))
        .route("/static/styles.css", axum::routing::get(styles_handler))
        .route("/generate", axum::routing::post(generate_handler))
        .route(
            "/history/{id}/image",
            axum::routing::get(image_handler),
        )
        .route(
            "/history/{id}/upscale",
            axum::routing::post(upscale_handler),
        )
        .route(
            "/history/{id}/variations",
            axum::routing::post(variations_handler),
        )
        .route(
            "/history/{id}/regenerate",
            axum::routing::post(regenerate_handler),
        )
        .route("/variations/{filename}", axum::routing::get(variation_file_handler))
        .route("/share", axum::routing::get(share_handler))
}

fn create_app(studio: Studio, store: ExpiringMemoryStore) -> Router {
    let session_layer = SessionManagerLayer::new(store)
        .with_secure(false)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(
            SESSION_EXPIRY_MINUTES,
        )));
    create_router()
        .with_state(AppState::new(studio))
        .layer(session_layer)
}

/// Binds the listener and serves the studio until the process stops.
pub async fn setup_server(
    listen_addr: &str,
    port: NonZeroU16,
    studio: Studio,
) -> Result<(), anyhow::Error> {
    let store = ExpiringMemoryStore::default();
    let _purge = store.spawn_purge(std::time::Duration::from_secs(SESSION_PURGE_INTERVAL_SECS));
    let app = create_app(studio, store);

    let addr = format!("{}:{}", listen_addr, port);
    info!("Starting server on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    if let Err(err) = axum::serve(listener, app).await {
        error!("Server error: {}", err);
    }
    Ok(())
}
