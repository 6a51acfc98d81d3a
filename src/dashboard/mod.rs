use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::get,
    Json, Router,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing::{info, warn};

use crate::db::TableCache;
use crate::error::ContenderError;
use crate::rating::{
    frame_for_query, parse_query_date, ContenderFrame, DataSource, LiveSource, WindowQuery,
};
use crate::stats::{SeasonType, StatsProvider, TeamRegistry};

#[derive(Clone)]
pub struct AppState {
    pub tables: Arc<TableCache>,
    pub provider: Arc<dyn StatsProvider>,
    pub registry: Arc<TeamRegistry>,
    pub season_type: SeasonType,
    pub request_timeout: Duration,
    /// Pinned season-picking date; today (UTC) when unset
    pub as_of: Option<NaiveDate>,
}

impl AppState {
    fn as_of(&self) -> NaiveDate {
        self.as_of.unwrap_or_else(|| Utc::now().date_naive())
    }
}

/// Build the Axum router for the dashboard.
pub fn router(state: AppState, logos_dir: PathBuf) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/api/dates", get(dates_handler))
        .route("/api/frame", get(frame_handler))
        .nest_service("/logos", ServeDir::new(logos_dir))
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

/// Serve the dashboard HTML page.
async fn index_handler() -> impl IntoResponse {
    Html(DASHBOARD_HTML)
}

#[derive(Debug, Serialize)]
struct DatesResponse {
    min: Option<NaiveDate>,
    max: Option<NaiveDate>,
    dates: Vec<NaiveDate>,
}

/// GET /api/dates
async fn dates_handler(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let table = state
        .tables
        .get()
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    let bounds = table.bounds();
    Ok(Json(DatesResponse {
        min: bounds.map(|b| b.min),
        max: bounds.map(|b| b.max),
        dates: table.dates(),
    }))
}

#[derive(Debug, Default, Deserialize)]
pub struct FrameParams {
    pub date: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    /// "static" or "live"
    pub source: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Static,
    Live,
}

/// Turn query-string parameters into a window query and the source to run it on.
///
/// `date` alone is a point-in-time query on the historical table; `from`+`to`
/// is an interval query, live unless `source=static`.
pub fn resolve_params(params: &FrameParams) -> Result<(WindowQuery, SourceKind), ContenderError> {
    let explicit = match params.source.as_deref().map(str::trim) {
        None | Some("") => None,
        Some("static") => Some(SourceKind::Static),
        Some("live") => Some(SourceKind::Live),
        Some(other) => {
            return Err(ContenderError::InvalidInput(format!(
                "unknown source '{}' (expected static or live)",
                other
            )))
        }
    };

    match (&params.date, &params.from, &params.to) {
        (Some(date), None, None) => {
            let date = parse_query_date(date)?;
            Ok((
                WindowQuery::point_in_time(date),
                explicit.unwrap_or(SourceKind::Static),
            ))
        }
        (None, Some(from), Some(to)) => {
            let query = WindowQuery::interval(parse_query_date(from)?, parse_query_date(to)?)?;
            Ok((query, explicit.unwrap_or(SourceKind::Live)))
        }
        _ => Err(ContenderError::InvalidInput(
            "pass either `date` or both `from` and `to`".to_string(),
        )),
    }
}

pub fn status_for(err: &ContenderError) -> StatusCode {
    match err {
        ContenderError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        ContenderError::DataSourceUnavailable { .. } => StatusCode::BAD_GATEWAY,
        ContenderError::DataIntegrity { .. } => StatusCode::BAD_GATEWAY,
    }
}

#[derive(Debug, Serialize)]
struct FrameResponse {
    #[serde(flatten)]
    frame: ContenderFrame,
    /// Zone bounding box `[x0, y0, x1, y1]` for the chart
    zone_box: (f64, f64, f64, f64),
    /// Teams whose position falls inside the contender zone
    contenders: Vec<String>,
}

impl FrameResponse {
    fn new(frame: ContenderFrame) -> Self {
        let contenders = frame
            .positions
            .iter()
            .filter(|p| frame.zone.contains(p.x, p.y))
            .map(|p| p.team.clone())
            .collect();
        FrameResponse {
            zone_box: frame.zone.bounds(),
            frame,
            contenders,
        }
    }
}

/// GET /api/frame?date=YYYY-MM-DD or /api/frame?from=..&to=..[&source=static|live]
async fn frame_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FrameParams>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let (query, kind) = resolve_params(&params).map_err(|e| (status_for(&e), e.to_string()))?;
    let as_of = state.as_of();

    let result = match kind {
        SourceKind::Static => {
            let table = state
                .tables
                .get()
                .await
                .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
            frame_for_query(&DataSource::Static(table.as_ref()), query, as_of).await
        }
        SourceKind::Live => {
            let source = DataSource::Live(LiveSource {
                provider: state.provider.as_ref(),
                registry: state.registry.as_ref(),
                season_type: state.season_type,
                timeout: state.request_timeout,
            });
            frame_for_query(&source, query, as_of).await
        }
    };

    match result {
        Ok(frame) => {
            info!(
                "Frame built for {:?} ({:?}): {} teams, slice {:?}",
                query,
                kind,
                frame.positions.len(),
                frame.slice
            );
            Ok(Json(FrameResponse::new(frame)))
        }
        Err(e) => {
            warn!("Frame for {:?} failed: {}", query, e);
            Err((status_for(&e), e.to_string()))
        }
    }
}

/// Embedded single-file dashboard (HTML + CSS + JS)
const DASHBOARD_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>NBA Contender Zone</title>
<style>
  :root {
    --bg: #0f1117;
    --card: #1a1d27;
    --border: #2a2d3a;
    --accent: #6c63ff;
    --gold: #ffd700;
    --orange: #ffa500;
    --red: #ff4f6a;
    --text: #e0e0e0;
    --muted: #8888aa;
  }
  * { box-sizing: border-box; margin: 0; padding: 0; }
  body { background: var(--bg); color: var(--text); font-family: 'Segoe UI', system-ui, sans-serif; }
  header { display: flex; align-items: center; gap: 1rem; padding: 1rem 2rem; border-bottom: 1px solid var(--border); }
  header h1 { font-size: 1.4rem; font-weight: 700; }
  main { padding: 1.5rem 2rem; display: grid; gap: 1.5rem; }
  .panel { background: var(--card); border: 1px solid var(--border); border-radius: 10px; overflow: hidden; }
  .panel-header { padding: .9rem 1.2rem; border-bottom: 1px solid var(--border); font-weight: 600; display: flex; justify-content: space-between; align-items: center; }
  .controls { display: flex; flex-wrap: wrap; gap: 1rem; align-items: center; padding: 1rem 1.2rem; }
  .controls label { color: var(--muted); font-size: .8rem; text-transform: uppercase; letter-spacing: .06em; }
  input[type=range] { flex: 1; min-width: 240px; }
  input[type=date] { background: var(--bg); color: var(--text); border: 1px solid var(--border); border-radius: 6px; padding: .3rem .5rem; }
  .btn { background: none; border: 1px solid var(--border); color: var(--muted); padding: .3rem .8rem; border-radius: 6px; cursor: pointer; font-size: .8rem; }
  .btn:hover { border-color: var(--accent); color: var(--accent); }
  #chart-container { padding: 1rem; position: relative; }
  canvas { width: 100% !important; }
  .error { color: var(--red); padding: .6rem 1.2rem; font-size: .9rem; display: none; }
  .contenders { padding: .9rem 1.2rem; color: var(--muted); font-size: .9rem; }
  .contenders b { color: var(--gold); }
</style>
</head>
<body>
<header>
  <h1>🏀 NBA Contender Zone</h1>
  <span style="margin-left:auto;color:var(--muted);font-size:.8rem;" id="slice-label"></span>
</header>

<main>
  <div class="panel">
    <div class="panel-header">Select a Date</div>
    <div class="controls">
      <label for="date-slider">Date</label>
      <input type="range" id="date-slider" min="0" max="0" value="0">
      <span id="date-value">–</span>
    </div>
    <div class="controls">
      <label>Live window</label>
      <input type="date" id="from">
      <input type="date" id="to">
      <button class="btn" onclick="loadInterval()">↻ Fetch</button>
    </div>
    <div class="error" id="error"></div>
  </div>

  <div class="panel">
    <div class="panel-header">Normalized Offensive Rating vs Normalized Defensive Rating</div>
    <div id="chart-container">
      <canvas id="chart"></canvas>
    </div>
    <div class="contenders" id="contenders"></div>
  </div>
</main>

<script>
const AXIS_MIN = -0.05, AXIS_MAX = 1.05, LOGO_SIZE = 0.11;
let dates = [];
const logos = {};
let frameSeq = 0;

function showError(msg) {
  const el = document.getElementById('error');
  el.textContent = msg || '';
  el.style.display = msg ? 'block' : 'none';
}

async function loadDates() {
  const r = await fetch('/api/dates');
  if (!r.ok) { showError(await r.text()); return; }
  const body = await r.json();
  dates = body.dates || [];
  const slider = document.getElementById('date-slider');
  slider.max = Math.max(dates.length - 1, 0);
  slider.value = slider.max;
  if (body.max) { document.getElementById('to').value = body.max; }
  if (body.min) { document.getElementById('from').value = body.min; }
  if (dates.length) { loadDate(dates[dates.length - 1]); }
}

async function loadDate(date) {
  document.getElementById('date-value').textContent = date;
  await loadFrame('/api/frame?date=' + encodeURIComponent(date), date);
}

async function loadInterval() {
  const from = document.getElementById('from').value;
  const to = document.getElementById('to').value;
  if (!from || !to) { showError('Pick both dates'); return; }
  await loadFrame('/api/frame?from=' + from + '&to=' + to, from + ' → ' + to);
}

function sliceLabel(slice, fallback) {
  if (!slice) return fallback + ' (no data)';
  return slice.kind === 'date' ? slice.date : slice.start + ' → ' + slice.end;
}

async function loadFrame(url, label) {
  // Only the latest request may render.
  const seq = ++frameSeq;
  const r = await fetch(url);
  if (seq !== frameSeq) return;
  if (!r.ok) {
    // Stop rendering this frame; keep the last good one on screen.
    const text = await r.text();
    if (seq === frameSeq) showError(text);
    return;
  }
  const frame = await r.json();
  if (seq !== frameSeq) return;
  showError('');
  document.getElementById('slice-label').textContent = sliceLabel(frame.slice, label);
  const c = frame.contenders || [];
  document.getElementById('contenders').innerHTML = c.length
    ? 'In the contender zone: <b>' + c.join(', ') + '</b>'
    : 'No team in the contender zone';
  drawFrame(frame);
}

function logo(team, redraw) {
  if (!logos[team]) {
    const img = new Image();
    img.onload = redraw;
    img.src = '/logos/' + encodeURIComponent(team) + '.png';
    logos[team] = img;
  }
  return logos[team];
}

function drawFrame(frame) {
  const canvas = document.getElementById('chart');
  const ctx = canvas.getContext('2d');
  const W = canvas.parentElement.clientWidth - 32;
  const H = 700;
  canvas.width = W;
  canvas.height = H;
  const span = AXIS_MAX - AXIS_MIN;
  const toX = v => ((v - AXIS_MIN) / span) * W;
  const toY = v => H - ((v - AXIS_MIN) / span) * H;

  ctx.clearRect(0, 0, W, H);

  // Contender zone, drawn below the teams
  const [x0, y0, x1, y1] = frame.zone_box;
  ctx.save();
  ctx.globalAlpha = 0.7;
  ctx.fillStyle = 'gold';
  ctx.strokeStyle = 'orange';
  ctx.beginPath();
  ctx.ellipse(toX((x0 + x1) / 2), toY((y0 + y1) / 2), ((x1 - x0) / 2 / span) * W, ((y1 - y0) / 2 / span) * H, 0, 0, Math.PI * 2);
  ctx.fill();
  ctx.stroke();
  ctx.restore();

  const redraw = () => drawFrame(frame);
  const sw = (LOGO_SIZE / span) * W, sh = (LOGO_SIZE / span) * H;
  const s = Math.min(sw, sh);
  for (const p of frame.positions) {
    const img = logo(p.team, redraw);
    const cx = toX(p.x), cy = toY(p.y);
    if (img.complete && img.naturalWidth > 0) {
      ctx.drawImage(img, cx - s / 2, cy - s / 2, s, s);
    } else {
      ctx.fillStyle = '#6c63ff';
      ctx.beginPath(); ctx.arc(cx, cy, 6, 0, Math.PI * 2); ctx.fill();
      ctx.fillStyle = '#e0e0e0';
      ctx.font = '11px system-ui';
      ctx.fillText(p.team, cx + 8, cy + 4);
    }
  }
}

document.getElementById('date-slider').addEventListener('input', e => {
  const date = dates[Number(e.target.value)];
  if (date) { loadDate(date); }
});

loadDates();
</script>
</body>
</html>"#;
