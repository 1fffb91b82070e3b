//! Test helpers.

use rand::RngCore;

/// Returns `length` random bytes.
pub fn rand_vec(length: usize) -> Vec<u8> {
    let mut vec = vec![0u8; length];
    rand::thread_rng().fill_bytes(&mut vec);
    vec
}

/// Splits `input` into owned chunks of `size` bytes, the last one possibly shorter.
pub fn split_length(input: &[u8], size: usize) -> Vec<Vec<u8>> {
    input.chunks(size).map(<[u8]>::to_vec).collect()
}

/// Instantiates generic test functions `fn name<B: Backend>()` once per compiled backend.
#[macro_export]
#[doc(hidden)]
macro_rules! backend_tests {
    ($($name:ident),* $(,)?) => {
        #[cfg(feature = "native")]
        mod native {
            $(
                #[test]
                fn $name() {
                    super::$name::<$crate::backend::Native>()
                }
            )*
        }

        #[cfg(feature = "soft")]
        mod soft {
            $(
                #[test]
                fn $name() {
                    super::$name::<$crate::backend::Soft>()
                }
            )*
        }
    };
}
