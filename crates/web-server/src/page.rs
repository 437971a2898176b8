use chrono::NaiveDate;

const INDEX_TEMPLATE: &str = r#"<!doctype html>
<html lang="tr">
<head>
<meta charset="utf-8">
<title>Varant Getiri Analizi</title>
<style>
body { font-family: sans-serif; margin: 2rem; }
table { border-collapse: collapse; margin-bottom: 1.5rem; }
th, td { padding: 0.25rem 0.75rem; border-bottom: 1px solid #ddd; text-align: left; }
td.num { text-align: right; }
.error { color: #b00020; }
</style>
</head>
<body>
<h1>Varant Getiri Analizi</h1>
<form id="analyze" method="post" action="/analyze" enctype="multipart/form-data">
  <label>Başlangıç <input type="date" name="start_date" value="{{start}}" required></label>
  <label>Bitiş <input type="date" name="end_date" value="{{end}}" required></label>
  <label>Min. vade <input type="date" name="expiry_date" value="{{end}}"></label>
  <br><br>
  <label>Varant CSV <input type="file" name="instruments_csv" accept=".csv,text/csv"></label>
  <label>Fiyat CSV <input type="file" name="prices_csv" accept=".csv,text/csv"></label>
  <br><br>
  <button type="submit">Analiz et</button>
</form>
<div id="results"></div>
<script>
const esc = (v) => String(v).replace(/[&<>"']/g, c => ({"&": "&amp;", "<": "&lt;", ">": "&gt;", '"': "&quot;", "'": "&#39;"})[c]);
const fmt = (v) => v === null || v === undefined ? "-" : esc(v);
function table(title, rows) {
  const body = rows.map(r => `<tr><td>${esc(r.code)}</td><td>${fmt(r.underlying)}</td><td>${esc(r.option_type)}</td>` +
    `<td>${fmt(r.issuer_name)}</td><td class="num">${r.strike_price === null ? "-" : r.strike_price.toFixed(2)}</td>` +
    `<td class="num">${r.return_pct >= 0 ? "+" : ""}${r.return_pct.toFixed(2)}%</td></tr>`).join("");
  return `<h2>${title}</h2><table><tr><th>Kod</th><th>Dayanak</th><th>Tip</th><th>İhraççı</th><th>Strike</th><th>Getiri</th></tr>${body}</table>`;
}
document.getElementById("analyze").addEventListener("submit", async (event) => {
  event.preventDefault();
  const out = document.getElementById("results");
  const response = await fetch("/analyze", { method: "POST", body: new FormData(event.target) });
  const data = await response.json();
  if (data.error) { out.innerHTML = `<p class="error">${esc(data.error)}</p>`; return; }
  out.innerHTML = `<p>${esc(data.date_range)} · ${esc(data.data_source)} · ${data.total_analyzed} varant</p>` +
    table("En yüksek getirili varantlar", data.rising) + table("En düşük getirili varantlar", data.falling);
});
</script>
</body>
</html>
"#;

/// Renders the form page with the given default dates.
pub fn render_index(default_start: NaiveDate, default_end: NaiveDate) -> String {
    INDEX_TEMPLATE
        .replace("{{start}}", &default_start.format("%Y-%m-%d").to_string())
        .replace("{{end}}", &default_end.format("%Y-%m-%d").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_dates_are_filled_in() {
        let html = render_index(
            NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 1, 8).unwrap(),
        );
        assert!(html.contains(r#"name="start_date" value="2026-01-01""#));
        assert!(html.contains(r#"name="expiry_date" value="2026-01-08""#));
        assert!(!html.contains("{{"));
    }

    #[test]
    fn uploaded_text_is_escaped_before_rendering() {
        let html = render_index(
            NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 1, 8).unwrap(),
        );
        for raw in ["${r.code}", "${r.option_type}", "${data.error}", "${data.date_range}", "${data.data_source}"] {
            assert!(!html.contains(raw), "{raw} is interpolated unescaped");
        }
        assert!(html.contains("${esc(r.code)}"));
        assert!(html.contains(r#"v === undefined ? "-" : esc(v)"#));
    }
}
