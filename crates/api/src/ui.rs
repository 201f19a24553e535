//! Embedded Dashboard Page

use axum::response::Html;

/// Serve the single-page dashboard
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Predictive Maintenance Dashboard</title>
<style>
  body { font-family: sans-serif; margin: 0; display: flex; min-height: 100vh; color: #262730; }
  aside { width: 240px; padding: 24px; background: #f0f2f6; }
  main { flex: 1; padding: 24px 40px; }
  nav button { padding: 8px 16px; border: none; background: none; cursor: pointer; font-size: 15px; border-bottom: 2px solid transparent; }
  nav button.active { border-bottom-color: #ff4b4b; color: #ff4b4b; }
  section { display: none; margin-top: 16px; }
  section.active { display: block; }
  table { border-collapse: collapse; font-size: 13px; }
  th, td { border: 1px solid #ddd; padding: 4px 8px; text-align: right; }
  th:first-child, td:first-child { text-align: left; }
  .metric { display: inline-block; margin-right: 48px; }
  .metric .label { font-size: 14px; color: #555; }
  .metric .value { font-size: 32px; }
  .error { color: #b00020; }
  img { max-width: 100%; }
</style>
</head>
<body>
<aside>
  <h3>Filters</h3>
  <label for="machine">Select Machine ID</label><br>
  <select id="machine"></select>
</aside>
<main>
  <h1>Predictive Maintenance Dashboard</h1>
  <nav>
    <button data-tab="summary" class="active">Summary</button>
    <button data-tab="failures">Failures</button>
    <button data-tab="predict">Predict</button>
  </nav>

  <section id="summary" class="active">
    <h2>Feature Overview</h2>
    <div id="summary-table"></div>
    <h2>RUL Distribution</h2>
    <img id="distribution-chart" alt="RUL distribution">
  </section>

  <section id="failures">
    <h2>Failure Analysis</h2>
    <img id="failure-chart" alt="Failures by operating mode">
  </section>

  <section id="predict">
    <h2>Real-Time Prediction</h2>
    <label for="row">Select Row Index</label>
    <input type="range" id="row" min="0" max="0" value="0">
    <span id="row-value">0</span>
    <div style="margin-top: 24px">
      <div class="metric"><div class="label">Failure Risk Probability</div><div class="value" id="risk">-</div></div>
      <div class="metric"><div class="label">Predicted RUL (minutes)</div><div class="value" id="rul">-</div></div>
    </div>
  </section>
  <p id="error" class="error"></p>
</main>
<script>
const $ = (id) => document.getElementById(id);
const STATS = ["count", "mean", "std", "min", "q25", "q50", "q75", "max"];
const LABELS = ["count", "mean", "std", "min", "25%", "50%", "75%", "max"];

async function fetchJson(url) {
  const response = await fetch(url);
  const body = await response.json();
  if (!response.ok) throw new Error(body.error || response.statusText);
  return body;
}

function showError(err) { $("error").textContent = err ? err.message : ""; }

function fmt(value) {
  return value === null || value === undefined ? "NaN" : Number(value).toFixed(6).replace(/\.?0+$/, "");
}

function cell(tag, text) {
  const el = document.createElement(tag);
  el.textContent = text;
  return el;
}

async function loadSummary() {
  const machine = encodeURIComponent($("machine").value);
  const summary = await fetchJson(`/api/v1/summary?machine=${machine}`);
  const columns = summary.statistics.columns;
  const table = document.createElement("table");
  const header = table.insertRow();
  header.append(cell("th", ""), ...columns.map(c => cell("th", c.name)));
  STATS.forEach((stat, i) => {
    const row = table.insertRow();
    row.append(cell("td", LABELS[i]), ...columns.map(c => cell("td", fmt(c[stat]))));
  });
  $("summary-table").replaceChildren(table);
  $("row").max = Math.max(summary.rows - 1, 0);
  if (Number($("row").value) > Number($("row").max)) $("row").value = 0;
  $("row-value").textContent = $("row").value;
}

async function loadPrediction() {
  const machine = encodeURIComponent($("machine").value);
  const prediction = await fetchJson(`/api/v1/predict?machine=${machine}&row=${$("row").value}`);
  $("risk").textContent = prediction.failure_risk;
  $("rul").textContent = prediction.remaining_minutes_whole;
}

async function refresh() {
  try {
    showError(null);
    await loadSummary();
    if (document.querySelector("section.active").id === "predict") await loadPrediction();
  } catch (err) { showError(err); }
}

document.querySelectorAll("nav button").forEach((button) => {
  button.addEventListener("click", () => {
    document.querySelectorAll("nav button, section").forEach(el => el.classList.remove("active"));
    button.classList.add("active");
    $(button.dataset.tab).classList.add("active");
    if (button.dataset.tab === "predict") loadPrediction().catch(showError);
  });
});

$("machine").addEventListener("change", refresh);
$("row").addEventListener("input", () => { $("row-value").textContent = $("row").value; });
$("row").addEventListener("change", () => loadPrediction().catch(showError));

(async () => {
  try {
    const { machines } = await fetchJson("/api/v1/machines");
    $("machine").replaceChildren(...machines.map(m => new Option(m, m)));
    $("distribution-chart").src = "/api/v1/charts/distribution.svg";
    $("failure-chart").src = "/api/v1/charts/failures.svg";
    await refresh();
  } catch (err) { showError(err); }
})();
</script>
</body>
</html>
"##;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_is_inserted_as_text() {
        // Machine ids and column names come from the CSV and must not be parsed as markup
        assert!(!INDEX_HTML.contains("innerHTML"));
        assert!(!INDEX_HTML.contains("insertAdjacentHTML"));
        assert!(INDEX_HTML.contains("new Option(m, m)"));
        assert!(INDEX_HTML.contains("el.textContent = text"));
    }
}
