//! Basic usage example for fwpack

use fwpack::{BundleBuilder, FW_HEADER_SIZE, FirmwareImage};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Packing a raw firmware image with fwpack...");

    let firmware = b"\x00\x01\x02\x03 pretend this is a Cortex-M vector table";
    let image = FirmwareImage::new(0x0800_0000, 0x0800_0000, firmware.to_vec())?;

    let builder = BundleBuilder::from_image(image)?.version_str("0x00010001")?;
    let bundle = builder.build()?;
    std::fs::write("app_packed.bin", &bundle)?;

    println!("Created app_packed.bin");
    println!("  Size: {} bytes", bundle.len());
    println!("  Header: {FW_HEADER_SIZE} bytes");
    println!("  Payload: {} bytes", firmware.len());

    let parsed = BundleBuilder::from_bundle(&bundle)?;
    println!();
    for line in parsed.header().summary_lines() {
        println!("{line}");
    }
    println!("Bundle verification passed");

    Ok(())
}
