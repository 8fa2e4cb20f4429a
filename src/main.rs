use std::path::PathBuf;

use clap::Parser;
use vasili_plot::render_log;
use vasili_plot::series::LinkSummary;

#[derive(Debug, Parser)]
#[command(version, about = "Render a latency/jitter/loss chart from a VASILI ping log")]
struct Cli {
    /// Ping log to render (timestamp, type, target, latency, status per row)
    #[arg(default_value = "vasili_log.csv")]
    input: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let report = render_log(&cli.input)?;

    println!("Plot saved to: {}", report.plot_path.display());
    print_link("Internet", &report.internet);
    print_link("Gateway", &report.gateway);

    Ok(())
}

fn print_link(name: &str, link: &LinkSummary) {
    if link.is_empty() {
        return;
    }
    match link.latency {
        Some(spread) => println!(
            "{name}: {} ok / {} lost ({:.1}% loss), latency min/avg/max {:.1}/{:.1}/{:.1} ms",
            link.ok,
            link.lost,
            link.loss_percent(),
            spread.min_ms,
            spread.avg_ms,
            spread.max_ms
        ),
        None => println!(
            "{name}: {} ok / {} lost ({:.1}% loss)",
            link.ok,
            link.lost,
            link.loss_percent()
        ),
    }
}
