// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

/// Creates a repository containing a set of recipes given as json.
///
/// make_repo!([{"name": "zlib", "versions": [{"version": "1.2.13"}]}]);
#[macro_export]
macro_rules! make_repo {
    ( [ $( $recipe:tt ),* $(,)? ] ) => {{
        let mut repo = $crate::RecipeRepository::new();
        $(
            repo.insert($crate::recipe!($recipe)).expect("failed to insert recipe");
        )*
        std::sync::Arc::new(repo)
    }};
}

/// Parse a request, panicking if it is invalid.
///
/// request!("app@1.0+newlib %gcc@12")
#[macro_export]
macro_rules! request {
    ($request:expr) => {{
        $request
            .parse::<$crate::PkgRequest>()
            .expect("invalid request")
    }};
}
