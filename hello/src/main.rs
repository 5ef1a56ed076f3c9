mod config;

use dotenv::dotenv;
use liquid_crystal_i2c::{LcdDriver, LinuxI2cBus, StdDelay};
use log::{debug, info};
use crate::config::Config;

fn main() -> eyre::Result<()> {
    // Initialize environment and logger
    dotenv().ok();
    pretty_env_logger::init();

    info!("Hello LCD starting...");

    debug!("Trying to load config...");
    let config = if let Some(config) = Config::try_load() {
        info!("Config loaded.");
        config
    } else {
        info!("Config not found. Using default");
        let config = Config::default();
        config.save()?;
        info!("Default config saved.");
        config
    };
    let config = config.with_env_overrides()?;

    info!(
        "LCD @ {} address {:#04x}, {}x{}, font {:?}",
        config.bus, config.address, config.columns, config.rows, config.font
    );

    debug!("Opening I2C bus...");
    let bus = LinuxI2cBus::open(&config.bus, config.address)?;
    debug!("{:?} opened.", bus);

    let mut lcd = LcdDriver::new(bus, StdDelay, config.address, config.columns, config.rows)
        .with_char_size(config.font.into());

    lcd.init()?;
    lcd.backlight()?;

    lcd.set_cursor(0, 0)?;
    lcd.print("Hello, LeeLab!")?;

    info!("Done.");

    Ok(())
}
