use clap::Parser;
use trapline::arch::ArchKind;

/// Memory region of the simulated target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RamRegion {
    pub base: u64,
    pub size: usize,
}

/// Program image loaded after the first resume.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageArg {
    pub path: String,
    pub load_address: u64,
}

fn parse_hex(s: &str) -> Result<u64, String> {
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    u64::from_str_radix(digits, 16).map_err(|e| format!("invalid hex number `{s}`: {e}"))
}

fn parse_ram(s: &str) -> Result<RamRegion, String> {
    let (base, size) = s
        .split_once(':')
        .ok_or_else(|| format!("expect <base>:<size>, got `{s}`"))?;
    let size = parse_hex(size)?;
    Ok(RamRegion {
        base: parse_hex(base)?,
        size: usize::try_from(size).map_err(|e| e.to_string())?,
    })
}

fn parse_image(s: &str) -> Result<ImageArg, String> {
    let (path, addr) = s
        .rsplit_once('@')
        .ok_or_else(|| format!("expect <path>@<address>, got `{s}`"))?;
    Ok(ImageArg {
        path: path.to_string(),
        load_address: parse_hex(addr)?,
    })
}

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Address to listen on (default: 127.0.0.1:1234)
    #[clap(long, default_value = "127.0.0.1:1234")]
    pub listen: String,

    /// Architecture of the simulated target: ia32, x64 or arm
    #[clap(long, default_value = "x64")]
    pub arch: ArchKind,

    /// RAM of the simulated target as <base>:<size>, hex
    #[clap(long, default_value = "0x1000:0x10000", value_parser = parse_ram)]
    pub ram: RamRegion,

    /// Image reported in the library list as <path>@<load address>.
    /// Images are loaded one by one after the program resumes.
    #[clap(long = "image", value_parser = parse_image)]
    pub images: Vec<ImageArg>,

    /// Stub config file (default: ~/.config/trapline/stub.toml)
    #[clap(long)]
    pub config: Option<String>,

    /// Period of the Ctrl-C poll while the program runs, in milliseconds.
    #[clap(long, default_value_t = 10)]
    pub tick_ms: u64,

    /// Exit after the first debug session ends (single-client mode).
    #[clap(long)]
    pub oneshot: bool,
}
