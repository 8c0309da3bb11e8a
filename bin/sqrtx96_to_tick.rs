use anyhow::Context;
use ethnum::U256;
use liquidity_kit::libraries::{sqrt_price::sqrt_price_x96_to_price, tick_math::TickMath};

fn main() -> anyhow::Result<()> {
    let args: Vec<_> = std::env::args().collect();
    if args.len() != 2 {
        eprintln!("usage: sqrtx96_to_tick SQRT_PRICE_X96");
        std::process::exit(1);
    }

    let sqrt_x96 = U256::from_str_radix(&args[1], 10).context("expected a number")?;

    let tick = TickMath::get_tick_at_sqrt_ratio(sqrt_x96)?;

    println!(
        "tick for sqrt_x96 price {} is {} (price ~ {})",
        sqrt_x96,
        tick,
        sqrt_price_x96_to_price(sqrt_x96)
    );
    Ok(())
}
