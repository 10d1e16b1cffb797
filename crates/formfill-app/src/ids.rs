// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

macro_rules! counter_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(u64);

        impl $name {
            pub const fn new(value: u64) -> Self {
                Self(value)
            }

            pub const fn get(self) -> u64 {
                self.0
            }

            pub const fn next(self) -> Self {
                Self(self.0.wrapping_add(1))
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }
    };
}

counter_id!(Generation);
counter_id!(RequestToken);
counter_id!(SaveToken);
counter_id!(TimerId);
counter_id!(ListenerId);
