//! HTML fragments for the results panel and chat turns.
//!
//! Templates are registered with an `.html` name so MiniJinja escapes every
//! interpolated value; backend text is never trusted as markup.

use minijinja::{context, Environment};

use super::view::AnalysisView;
use super::RenderError;
use crate::models::{ChatTurn, Speaker};

const RESULTS_TEMPLATE: &str = "results.html";
const TURN_TEMPLATE: &str = "turn.html";

const RESULTS_SOURCE: &str = r#"<div class="card triage-card {{ view.severity_class }}" data-severity="{{ view.severity }}">
  <div class="triage-header">
    <h2>Assessment Result</h2>
    <div class="triage-badge">{{ view.triage_label }}</div>
  </div>
  <p class="triage-description">{{ view.advice }}</p>
</div>
<div class="card">
  <div class="card-header">
    <h3>Possible Conditions</h3>
    <small class="muted">Based on your symptoms</small>
  </div>
  <div class="conditions">
  {%- for condition in view.conditions %}
    <div class="condition-item">
      <div class="condition-name">{{ condition.name }}</div>
      <div class="condition-probability">
        <div class="probability-bar">
          <div class="probability-fill" style="width: {{ condition.percent }}%"></div>
        </div>
        <span class="probability-text">{{ condition.percent }}%</span>
      </div>
    </div>
  {%- else %}
    <p class="muted">{{ view.conditions_placeholder }}</p>
  {%- endfor %}
  </div>
</div>
<div class="card two-col">
  <div class="selfcare-section">
    <div class="section-header"><h3>Self-Care Recommendations</h3></div>
    <ul class="collapsible">
    {%- for item in view.selfcare.items %}
      <li{% if view.selfcare.is_fallback %} class="muted"{% endif %}>{{ item }}</li>
    {%- endfor %}
    </ul>
  </div>
  <div class="warning-section">
    <div class="section-header"><h3>Warning Signs</h3></div>
    <ul class="collapsible danger">
    {%- for item in view.warning.items %}
      <li{% if view.warning.is_fallback %} class="muted"{% endif %}>{{ item }}</li>
    {%- endfor %}
    </ul>
  </div>
</div>
<div class="card">
  <h3>Summary</h3>
  <p class="summary">{{ view.summary }}</p>
</div>
"#;

const TURN_SOURCE: &str = r#"<div class="message {{ role }}-message">
  <div>{{ text }}</div>
  <div class="message-time">{{ time }}</div>
</div>
"#;

/// Renders results panels and transcript entries.
pub struct HtmlRenderer {
    env: Environment<'static>,
}

impl HtmlRenderer {
    pub fn new() -> Result<Self, RenderError> {
        let mut env = Environment::new();
        env.add_template(RESULTS_TEMPLATE, RESULTS_SOURCE)?;
        env.add_template(TURN_TEMPLATE, TURN_SOURCE)?;
        Ok(Self { env })
    }

    /// Results panel for one analysis.
    pub fn render_results(&self, view: &AnalysisView) -> Result<String, RenderError> {
        let tmpl = self.env.get_template(RESULTS_TEMPLATE)?;
        Ok(tmpl.render(context! { view => view })?)
    }

    /// One chat message block with its `HH:MM` label.
    pub fn render_turn(&self, turn: &ChatTurn) -> Result<String, RenderError> {
        let role = match turn.speaker {
            Speaker::User => "user",
            Speaker::Assistant => "bot",
        };
        let tmpl = self.env.get_template(TURN_TEMPLATE)?;
        Ok(tmpl.render(context! {
            role => role,
            text => turn.text.as_str(),
            time => turn.time_label(),
        })?)
    }
}
