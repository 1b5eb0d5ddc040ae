/// Walk a list of type parameter names, invoking `$m` with every prefix of it.
#[doc(hidden)]
#[macro_export]
macro_rules! tuple_prefixes {
    ($m:ident; [$($done:ident),*];) => {};
    ($m:ident; [$($done:ident),*]; $next:ident $(, $rest:ident)*) => {
        $m!($($done,)* $next);
        $crate::tuple_prefixes!($m; [$($done,)* $next]; $($rest),*);
    };
}

/// Invoke `$m` once per tuple arity from 1 to 26 with the type parameter names `A`, then
/// `A, B`, and so on up to `A..=Z`.
#[macro_export]
macro_rules! all_tuples {
    ($m:ident) => {
        $crate::tuple_prefixes!(
            $m; [];
            A, B, C, D, E, F, G, H, I, J, K, L, M, N, O, P, Q, R, S, T, U, V, W, X, Y, Z
        );
    };
}

#[cfg(test)]
mod tests {
    trait Arity {
        const ARITY: usize;
    }

    macro_rules! count_arity {
        ($($name: ident),*) => {
            impl<$($name),*> Arity for ($($name,)*) {
                const ARITY: usize = [$(stringify!($name)),*].len();
            }
        };
    }

    all_tuples!(count_arity);

    #[test]
    fn covers_every_arity() {
        assert_eq!(<(u8,)>::ARITY, 1);
        assert_eq!(<(u8, i8, u16)>::ARITY, 3);
        assert_eq!(
            <(
                u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8,
                u8, u8, u8, u8, u8,
            )>::ARITY,
            26
        );
    }
}
