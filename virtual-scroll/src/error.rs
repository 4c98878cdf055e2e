/// A rejected viewport configuration.
///
/// Window arithmetic never propagates a bad configuration into rendering: these are reported at
/// the boundary instead.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("item height must be greater than zero")]
    ZeroItemHeight,

    #[error("list extent overflows u64 ({item_count} items of height {item_height})")]
    ExtentOverflow { item_count: usize, item_height: u32 },

    #[error("window end {end_index} is before its start {start_index}")]
    InvertedRange { start_index: usize, end_index: usize },
}

pub(crate) fn validate_extent(item_height: u32, item_count: usize) -> Result<(), ConfigError> {
    if item_height == 0 {
        return Err(ConfigError::ZeroItemHeight);
    }
    let fits = u64::try_from(item_count)
        .ok()
        .and_then(|count| count.checked_mul(item_height as u64))
        .is_some();
    if !fits {
        return Err(ConfigError::ExtentOverflow {
            item_count,
            item_height,
        });
    }
    Ok(())
}
