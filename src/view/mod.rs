//! Terminal rendering of the dashboard panels.
//!
//! Cards, lists, and bar charts as plain formatted text. Render functions
//! return strings so they stay testable without a terminal.

use chrono::{DateTime, Local, Utc};

use crate::models::{Match, MatchBoard, OverviewStats, Player, Question};
use crate::poll::{Dashboard, PanelState};

const BAR_WIDTH: usize = 24;
const RULE_WIDTH: usize = 46;

const MSG_LOADING: &str = "Cargando…";
const MSG_NO_DATA: &str = "Sin datos";
const MSG_NO_MATCHES: &str = "No hay partidas activas ahora mismo.";
const MSG_NO_QUESTIONS: &str = "No hay preguntas recientes.";
const MSG_ROOMS_UNAVAILABLE: &str = "El backend no expone salas activas todavía.";
const MSG_UNAVAILABLE: &str = "Función no disponible en este backend.";

/// Render the full dashboard, all three panels stacked.
pub fn render_dashboard(dash: &Dashboard) -> String {
    let mut out = format!(
        "📊 Dashboard · Preguntados — actualizado {}\n\n",
        Local::now().format("%H:%M:%S")
    );
    out.push_str(&render_overview(&dash.overview));
    out.push('\n');
    out.push_str(&render_matches(&dash.matches));
    out.push('\n');
    out.push_str(&render_questions(&dash.questions));
    out
}

/// Overview panel: KPI cards, winners bar chart, category shares.
pub fn render_overview(panel: &PanelState<OverviewStats>) -> String {
    let mut out = section_title("📈 Estadísticas globales");
    if panel.loading {
        out.push_str(&line(MSG_LOADING));
        return out;
    }
    if let Some(msg) = &panel.error {
        out.push_str(&line(&format!("⚠ {}", msg)));
    }
    let Some(stats) = &panel.data else {
        out.push_str(&line(if panel.unavailable {
            MSG_UNAVAILABLE
        } else {
            MSG_NO_DATA
        }));
        return out;
    };

    out.push_str(&kpi_line("Partidas jugadas", stats.played_matches));
    out.push_str(&kpi_line(
        "Ganadores distintos",
        stats.distinct_winners() as u64,
    ));
    out.push_str(&kpi_line("Aciertos totales", stats.total_correct));
    out.push_str(&kpi_line("Errores totales", stats.total_wrong));

    out.push_str("\n  🏆 Ranking de ganadores\n");
    if stats.winners.is_empty() {
        out.push_str(&line("    Sin datos"));
    } else {
        let max = stats.winners.iter().map(|w| w.wins).max().unwrap_or(0);
        for w in &stats.winners {
            out.push_str(&format!(
                "    {:<16} {} {}\n",
                w.alias,
                bar(w.wins, max),
                w.wins
            ));
        }
    }

    out.push_str(&format!("\n  📚 {}\n", stats.categories_label()));
    if stats.top_categories.is_empty() {
        out.push_str(&line("    Sin datos"));
    } else {
        for c in &stats.top_categories {
            out.push_str(&format!(
                "    {:<16} {} {:>3}%\n",
                c.name,
                bar(u64::from(c.value), 100),
                c.value
            ));
        }
    }
    out
}

/// Matches panel: one card per room, bucketed.
pub fn render_matches(panel: &PanelState<MatchBoard>) -> String {
    let mut out = section_title("🎮 Partidas activas");
    if panel.loading {
        out.push_str(&line(MSG_LOADING));
        return out;
    }
    if panel.unavailable {
        out.push_str(&line(MSG_ROOMS_UNAVAILABLE));
        return out;
    }
    if let Some(msg) = &panel.error {
        out.push_str(&line(&format!("⚠ {}", msg)));
    }
    let Some(board) = &panel.data else {
        out.push_str(&line(MSG_NO_DATA));
        return out;
    };
    if board.is_empty() {
        out.push_str(&line(MSG_NO_MATCHES));
        return out;
    }

    for m in &board.active {
        out.push_str(&match_card(m));
    }
    if !board.recent.is_empty() {
        out.push_str("\n  Últimas 24 horas\n");
        for m in &board.recent {
            out.push_str(&match_card(m));
        }
    }
    out
}

/// Questions panel: text, category, option chips.
pub fn render_questions(panel: &PanelState<Vec<Question>>) -> String {
    let mut out = section_title("❓ Preguntas");
    if panel.loading {
        out.push_str(&line(MSG_LOADING));
        return out;
    }
    if panel.unavailable {
        out.push_str(&line(MSG_UNAVAILABLE));
        return out;
    }
    if let Some(msg) = &panel.error {
        out.push_str(&line(&format!("⚠ {}", msg)));
    }
    let Some(questions) = &panel.data else {
        out.push_str(&line(MSG_NO_DATA));
        return out;
    };
    if questions.is_empty() {
        out.push_str(&line(MSG_NO_QUESTIONS));
        return out;
    }

    for q in questions {
        out.push_str(&question_card(q));
    }
    out
}

fn match_card(m: &Match) -> String {
    let plural = if m.player_count() == 1 { "" } else { "s" };
    let mut out = format!(
        "  Sala: {}  ·  {} conectado{}\n",
        m.id,
        m.player_count(),
        plural
    );
    if !m.players.is_empty() {
        let chips: Vec<&str> = m.players.iter().map(Player::label).collect();
        out.push_str(&format!("    [{}]\n", chips.join("] [")));
    }
    if let Some(t) = m.started_at {
        out.push_str(&format!("    Inició: {}\n", local_time(t)));
    }
    out
}

fn question_card(q: &Question) -> String {
    let mut out = format!("  {}\n    Categoría: {}\n", q.text, q.category_label());
    if !q.options.is_empty() {
        out.push_str(&format!("    ({})\n", q.options.join(" · ")));
    }
    out
}

fn section_title(title: &str) -> String {
    format!("{}\n{}\n", title, "─".repeat(RULE_WIDTH))
}

fn line(text: &str) -> String {
    format!("  {}\n", text)
}

fn kpi_line(label: &str, value: u64) -> String {
    format!("  {:<22} {:>8}\n", label, value)
}

fn local_time(t: DateTime<Utc>) -> String {
    t.with_timezone(&Local).format("%H:%M:%S").to_string()
}

/// Horizontal bar scaled to `max`; nonzero values always get one block.
fn bar(value: u64, max: u64) -> String {
    if max == 0 || value == 0 {
        return "░".repeat(BAR_WIDTH);
    }
    let filled = ((value as f64 / max as f64) * BAR_WIDTH as f64).round() as usize;
    let filled = filled.clamp(1, BAR_WIDTH);
    let mut out = "█".repeat(filled);
    out.push_str(&"░".repeat(BAR_WIDTH - filled));
    out
}
