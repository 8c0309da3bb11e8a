use liquidity_kit::token_pair::AnyTokenPair;

/// we have 2 args, token_a and token_b (both 0x addresses or both Solana mints)
/// returns token_0 and token_1
fn main() -> anyhow::Result<()> {
    let args: Vec<_> = std::env::args().collect();
    if args.len() != 3 {
        eprintln!("usage: token_order TOKEN_A TOKEN_B");
        std::process::exit(1);
    }

    let (token0, token1, _flipped) = AnyTokenPair::parse(&args[1], &args[2])?.to_strings();

    println!("token_0: {} , token_1:{}", token0, token1);
    Ok(())
}
