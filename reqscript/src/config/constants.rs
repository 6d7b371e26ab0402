pub mod compile_time {
    pub mod parsing {
        /// Maximum accepted script length in bytes
        /// SECURITY: Bounds work done by the quote-aware scanners per script
        pub const MAX_SCRIPT_LENGTH: usize = 16 * 1024;

        /// Maximum number of calls in a single method chain
        /// SECURITY: Bounds dispatch work per leaf condition
        pub const MAX_CHAIN_CALLS: usize = 64;
    }

    pub mod arithmetic {
        /// Maximum recursion depth of the expression grammar
        /// SECURITY: Prevents stack overflow on deeply nested parentheses
        pub const MAX_EXPR_DEPTH: usize = 128;
    }

    pub mod logging {
        /// Bounded capacity of the in-memory log channel
        /// RESOURCE: Controls memory held by the error channel
        pub const MEMORY_CHANNEL_CAPACITY: usize = 256;
    }
}
