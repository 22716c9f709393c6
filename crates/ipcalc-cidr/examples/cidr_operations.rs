//! CIDR operations example
//!
//! Run with: RUST_LOG=debug cargo run -p ipcalc-cidr --example cidr_operations

use ipcalc_cidr::{CidrBlock, Limits};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    println!("IPCALC - CIDR Operations Example\n");

    let cidr = CidrBlock::parse("192.168.1.0/24")?;

    println!("CIDR: {}", cidr);
    println!("─────────────────────────────");
    println!("First:         {}", cidr.first());
    println!("Last:          {}", cidr.last());
    println!("Total IPs:     {:?}", cidr.size());
    println!("Prefix length: /{}", cidr.prefix_len());

    println!("\nChecking IP containment:");
    println!("192.168.1.100 in range? {}", cidr.contains(&"192.168.1.100".parse()?));
    println!("192.168.2.1 in range?   {}", cidr.contains(&"192.168.2.1".parse()?));

    println!("\nFirst 5 IPs in range:");
    for (i, ip) in cidr.iter().take(5).enumerate() {
        println!("  {}: {}", i + 1, ip);
    }

    println!("\nSplit into /26:");
    for block in cidr.split(26)?.collect_bounded(&Limits::from_env()?)? {
        println!("  {}", block);
    }

    println!("\nRange 10.0.0.5 - 10.0.0.20 as CIDR:");
    for block in ipcalc_cidr::range_to_cidr("10.0.0.5", "10.0.0.20")? {
        println!("  {}", block);
    }

    let v6 = ipcalc_cidr::cidr_to_range("2001:db8::/126")?;
    println!("\n2001:db8::/126 covers {}", v6);
    println!("Expanded start: {}", v6.first().expanded());

    println!("\nRandom IPv4: {}", ipcalc_cidr::random_v4(&mut rand::thread_rng()));

    Ok(())
}
