use chrono::Local;
use std::error::Error;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::types::ResolvedDraw;
use crate::views::DrawPage;

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

pub fn report_filename(page: &DrawPage) -> String {
    match &page.draw {
        Some(draw) => format!("lotofacil_{}.html", draw.number),
        None => "lotofacil_unavailable.html".to_string(),
    }
}

pub fn generate_html_report(page: &DrawPage) -> String {
    let title = match &page.draw {
        Some(draw) => format!("Lotofácil - Concurso {}", draw.number),
        None => "Lotofácil".to_string(),
    };

    let mut html = String::new();

    html.push_str(&format!(
        r#"<!DOCTYPE html>
<html lang="pt-BR">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{}</title>
    <style>
        body {{
            font-family: 'Segoe UI', Tahoma, Geneva, sans-serif;
            margin: 0;
            padding: 20px;
            background: linear-gradient(135deg, #930089 0%, #5b005a 100%);
            min-height: 100vh;
        }}
        .container {{
            max-width: 900px;
            margin: 0 auto;
            background: white;
            border-radius: 15px;
            box-shadow: 0 20px 40px rgba(0,0,0,0.1);
            overflow: hidden;
        }}
        .header {{
            background: #930089;
            color: white;
            padding: 30px;
            text-align: center;
        }}
        .header h1 {{
            margin: 0;
            font-size: 2.2em;
        }}
        .header .date {{
            font-size: 1.2em;
            margin-top: 10px;
            opacity: 0.9;
        }}
        .content {{
            padding: 30px;
        }}
        .numbers {{
            display: grid;
            grid-template-columns: repeat(5, 1fr);
            gap: 12px;
            margin-bottom: 30px;
        }}
        .ball {{
            background: #930089;
            color: white;
            border-radius: 50%;
            width: 56px;
            height: 56px;
            line-height: 56px;
            margin: 0 auto;
            text-align: center;
            font-size: 1.4em;
            font-weight: 700;
        }}
        .rolled-over {{
            background: #feca57;
            padding: 12px;
            border-radius: 8px;
            text-align: center;
            font-weight: 600;
            margin-bottom: 20px;
        }}
        table {{
            width: 100%;
            border-collapse: collapse;
        }}
        th, td {{
            padding: 10px;
            border-bottom: 1px solid #e2e8f0;
            text-align: left;
        }}
        td.amount {{
            text-align: right;
            font-family: 'Courier New', monospace;
        }}
        .next-draw {{
            background: #edf2f7;
            padding: 20px;
            margin-top: 30px;
            border-radius: 10px;
        }}
        .message {{
            padding: 40px;
            text-align: center;
            color: #4a5568;
            font-size: 1.2em;
        }}
        .footer {{
            background: #2d3748;
            color: white;
            padding: 20px;
            text-align: center;
            font-size: 0.9em;
        }}
    </style>
</head>
<body>
    <div class="container">
"#,
        escape_html(&title)
    ));

    match &page.draw {
        Some(draw) => push_draw(&mut html, draw),
        None => {
            let message = page.message.as_deref().unwrap_or("Resultado não encontrado.");
            html.push_str(&format!(
                r#"        <div class="header">
            <h1>Lotofácil</h1>
        </div>
        <div class="message">{}</div>
"#,
                escape_html(message)
            ));
        }
    }

    html.push_str(&format!(
        r#"        <div class="footer">
            <p>Relatório gerado em: {}</p>
            <p>Dados: Caixa Econômica Federal</p>
        </div>
    </div>
</body>
</html>
"#,
        Local::now().format("%d/%m/%Y %H:%M:%S")
    ));

    html
}

fn push_draw(html: &mut String, draw: &ResolvedDraw) {
    html.push_str(&format!(
        r#"        <div class="header">
            <h1>Lotofácil - Concurso {}</h1>
            <div class="date">{}</div>
        </div>
        <div class="content">
"#,
        draw.number,
        escape_html(&draw.drawn_at)
    ));

    if draw.rolled_over {
        html.push_str("            <div class=\"rolled-over\">ACUMULOU!</div>\n");
    }

    html.push_str("            <div class=\"numbers\">\n");
    for label in draw.numbers.labels() {
        html.push_str(&format!(
            "                <div class=\"ball\">{}</div>\n",
            escape_html(&label)
        ));
    }
    html.push_str("            </div>\n");

    if !draw.prize_tiers.is_empty() {
        html.push_str(
            r#"            <table>
                <tr><th>Faixa</th><th>Ganhadores</th><th>Prêmio</th></tr>
"#,
        );
        for tier in &draw.prize_tiers {
            html.push_str(&format!(
                "                <tr><td>{}</td><td>{}</td><td class=\"amount\">{}</td></tr>\n",
                escape_html(&tier.description),
                tier.winner_count,
                escape_html(&tier.prize_display)
            ));
        }
        html.push_str("            </table>\n");
    }

    if draw.next_draw_date.is_some() || draw.next_draw_estimated_prize_display.is_some() {
        html.push_str("            <div class=\"next-draw\">\n");
        if let Some(date) = &draw.next_draw_date {
            html.push_str(&format!(
                "                <p>Próximo concurso: {}</p>\n",
                escape_html(date)
            ));
        }
        if let Some(prize) = &draw.next_draw_estimated_prize_display {
            html.push_str(&format!(
                "                <p>Prêmio estimado: {}</p>\n",
                escape_html(prize)
            ));
        }
        html.push_str("            </div>\n");
    }

    html.push_str("        </div>\n");
}

pub fn save_html_report_to_path(
    html_content: &str,
    filename: &str,
    report_path: &Path,
) -> Result<PathBuf, Box<dyn Error>> {
    std::fs::create_dir_all(report_path)?;

    let filepath = report_path.join(filename);
    let mut file = File::create(&filepath)?;
    file.write_all(html_content.as_bytes())?;
    Ok(filepath)
}

pub fn generate_and_save_report(
    page: &DrawPage,
    report_path: &Path,
) -> Result<PathBuf, Box<dyn Error>> {
    let html_content = generate_html_report(page);
    save_html_report_to_path(&html_content, &report_filename(page), report_path)
}
