/// Short technology blurbs used to seed a demo knowledge base.
pub const SAMPLE_DOCUMENTS: [&str; 15] = [
    "Python is a high-level programming language known for its simplicity and readability.",
    "Machine learning is a subset of artificial intelligence that enables systems to learn from data.",
    "Docker is a platform for developing, shipping, and running applications in containers.",
    "Kubernetes is an open-source container orchestration system for automating deployment and scaling.",
    "FastAPI is a modern Python web framework for building APIs with automatic documentation.",
    "PostgreSQL is a powerful open-source relational database management system.",
    "Redis is an in-memory data structure store used as a database, cache, and message broker.",
    "Git is a distributed version control system for tracking changes in source code.",
    "React is a JavaScript library for building user interfaces, maintained by Meta.",
    "Transformers are deep learning models that use self-attention mechanisms for NLP tasks.",
    "Vector databases store data as high-dimensional vectors for similarity search.",
    "RAG (Retrieval-Augmented Generation) combines information retrieval with text generation.",
    "LangChain is a framework for developing applications powered by large language models.",
    "MCP (Model Context Protocol) is a standard for connecting LLMs to external tools and data.",
    "Embeddings are numerical representations of text that capture semantic meaning.",
];
