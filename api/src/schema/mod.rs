mod article;

pub use self::article::Article;
