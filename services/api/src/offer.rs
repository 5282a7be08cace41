use clap::Args;
use fare_lens::config::AppConfig;
use fare_lens::error::AppError;
use fare_lens::offers::{ingest, OfferEngine, OfferViewModel};
use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct OfferViewArgs {
    /// Path to a raw offer JSON document
    pub(crate) path: PathBuf,
    /// Emit single-line JSON instead of pretty-printed JSON
    #[arg(long, conflicts_with = "summary")]
    pub(crate) compact: bool,
    /// Print a short human-readable summary instead of JSON
    #[arg(long)]
    pub(crate) summary: bool,
}

pub(crate) fn run_offer_view(args: OfferViewArgs) -> Result<(), AppError> {
    let OfferViewArgs {
        path,
        compact,
        summary,
    } = args;

    let config = AppConfig::load()?;
    let engine = OfferEngine::new(config.pricing);

    let reader = BufReader::new(File::open(&path)?);
    let offer = ingest::parse_reader(reader)?;
    let view = engine.view(&offer);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if summary {
        render_summary(&mut out, &view)?;
    } else if compact {
        serde_json::to_writer(&mut out, &view).map_err(io::Error::from)?;
        writeln!(out)?;
    } else {
        serde_json::to_writer_pretty(&mut out, &view).map_err(io::Error::from)?;
        writeln!(out)?;
    }
    Ok(())
}

pub(crate) fn render_summary(out: &mut impl Write, view: &OfferViewModel) -> io::Result<()> {
    writeln!(
        out,
        "Offer {} ({})",
        view.id.as_deref().unwrap_or("-"),
        view.fare_family
    )?;

    for (index, leg) in view.legs.iter().enumerate() {
        let stops = match leg.stops {
            0 => "nonstop".to_string(),
            1 => "1 stop".to_string(),
            n => format!("{n} stops"),
        };
        writeln!(
            out,
            "- Leg {}: {} -> {}, {}, {}",
            index + 1,
            leg.origin,
            leg.destination,
            leg.duration_label,
            stops
        )?;
        writeln!(
            out,
            "  bags: carry-on {} ({}kg), checked {} x {}kg, fare {}",
            if leg.baggage.carry_on { "yes" } else { "no" },
            leg.baggage.carry_on_weight_kg,
            leg.baggage.checked_quantity,
            leg.baggage.checked_weight_kg,
            leg.baggage.fare_family
        )?;
    }

    let price = &view.price;
    writeln!(
        out,
        "Price: {} {} (base {}, fees {} / {}%)",
        price.total, view.currency, price.base_price, price.fees, price.fees_percentage
    )?;
    writeln!(
        out,
        "True price: {} {} (bag {}, seat {})",
        price.true_price, view.currency, price.estimated_baggage_fee, price.estimated_seat_fee
    )?;

    if view.consistency.differs {
        writeln!(out, "Legs differ in baggage or fare conditions")?;
    }
    for warning in &view.warnings {
        writeln!(out, "warning: {warning}")?;
    }
    Ok(())
}
