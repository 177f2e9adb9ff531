
#[macro_export]
macro_rules! sign_extend {
    ($val:expr, $bits:expr) => {
        ((($val as u32) << (32 - $bits)) as i32 >> (32 - $bits))
    };
}

#[macro_export]
macro_rules! zero_extend {
    ($val:expr, $bits:expr) => {
        (($val as u32) & (((1u64 << $bits) - 1) as u32))
    };
}
