use anyhow::Context;
use liquidity_kit::{
    libraries::{price::Price, sqrt_price::encode_sqrt_price_x96, tick_math::TickMath},
    tick_range::nearest_usable_tick,
};

// we have 2 args, price and tick_spacing

fn main() -> anyhow::Result<()> {
    let args: Vec<_> = std::env::args().collect();
    if args.len() != 3 {
        eprintln!("usage: price_to_tick PRICE TICK_SPACING");
        std::process::exit(1);
    }

    let price: Price = args[1].parse().context("expected a positive decimal price")?;
    let tick_spacing = args[2]
        .parse::<i32>()
        .ok()
        .filter(|spacing| *spacing > 0)
        .context("expected a positive tick_spacing")?;

    let sqrt_price_x96 = encode_sqrt_price_x96(&price)?;
    println!("{sqrt_price_x96}");

    let tick_not_aligned = TickMath::get_tick_at_sqrt_ratio(sqrt_price_x96)?;

    // align tick with tick_spacing
    let tick = nearest_usable_tick(tick_not_aligned, tick_spacing)?;

    println!(
        "tick for sqrt_x96 price {} is {} and not_aligned tick is {}",
        String::from(price),
        tick,
        tick_not_aligned
    );
    Ok(())
}
