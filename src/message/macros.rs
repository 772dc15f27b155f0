/// Defines an "open" enum: a transparent newtype with associated constants for the known values.
///
/// Unlike a Rust `enum`, any value of the underlying integer is representable, so codes received
/// from a newer daemon survive a decode unchanged.
macro_rules! ffi_enum {
    (
        $( #[$attrs:meta] )*
        $v:vis enum $name:ident: $native:ty {
            $(
                $( #[$variant_attrs:meta] )*
                $variant:ident = $value:expr
            ),+
            $(,)?
        }
    ) => {
        $( #[$attrs] )*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, bytemuck::Pod, bytemuck::Zeroable)]
        #[repr(transparent)]
        $v struct $name(pub $native);

        impl $name {
            $(
                $( #[$variant_attrs] )*
                $v const $variant: Self = Self($value);
            )+

            /// Returns the raw wire value.
            #[inline]
            $v fn get(self) -> $native {
                self.0
            }

            /// Returns whether this is one of the values known to this library.
            $v fn is_known(self) -> bool {
                match self {
                    $( Self::$variant => true, )+
                    _ => false,
                }
            }
        }

        #[allow(unreachable_patterns)]
        impl core::fmt::Debug for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                match *self {
                    $(
                        Self::$variant => f.write_str(stringify!($variant)),
                    )+

                    _ => write!(f, "(unknown {}: {:#x})", stringify!($name), self.0),
                }
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Debug::fmt(self, f)
            }
        }
    };
}
